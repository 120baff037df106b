//! Per-compile state: bound values, collected parameters and the scope path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::{QueryError, QueryResult};

/// Values for placeholder keys.
///
/// Keys may be dotted scope paths (`sub_q.start`) to target a placeholder
/// inside a specific aliased subquery; a bare key serves every scope that has
/// no scoped value of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `value`, replacing any previous value.
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read bindings from a JSON object, e.g. `{"start": 3, "names": ["a", "b"]}`.
    pub fn from_json(source: &str) -> QueryResult<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(source)
            .map_err(|e| QueryError::InvalidBinding(format!("expected a JSON object: {}", e)))?;
        let mut bindings = Bindings::new();
        for (key, json) in map {
            let value = Value::try_from(json)?;
            bindings.insert(key, value);
        }
        Ok(bindings)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (key, value) in iter {
            bindings.insert(key, value);
        }
        bindings
    }
}

#[derive(Debug)]
struct Frame {
    alias: Option<String>,
    tables: Vec<String>,
    bare: bool,
}

/// Mutable state threaded through one top-level compile.
///
/// Collects parameter values in the order their markers are emitted, and
/// tracks the stack of query scopes being rendered so correlated columns and
/// scoped placeholder keys can be resolved against enclosing queries.
#[derive(Debug)]
pub struct RenderContext<'b> {
    bindings: &'b Bindings,
    params: Vec<Value>,
    frames: Vec<Frame>,
}

impl<'b> RenderContext<'b> {
    pub fn new(bindings: &'b Bindings) -> Self {
        Self {
            bindings,
            params: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Parameter values collected so far, in marker order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }

    /// Enter a query scope. `tables` are the names reachable from its FROM;
    /// `bare` scopes render columns by projection name only.
    pub fn push_scope(&mut self, alias: Option<&str>, tables: Vec<String>, bare: bool) {
        tracing::trace!(alias, depth = self.frames.len() + 1, "enter scope");
        self.frames.push(Frame {
            alias: alias.map(str::to_string),
            tables,
            bare,
        });
    }

    pub fn pop_scope(&mut self) {
        if let Some(frame) = self.frames.pop() {
            tracing::trace!(alias = frame.alias.as_deref(), depth = self.frames.len(), "leave scope");
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the innermost scope renders bare projection names.
    pub fn is_bare(&self) -> bool {
        self.frames.last().is_some_and(|f| f.bare)
    }

    /// Aliases of the enclosing scopes, outermost first, joined by dots.
    pub fn path(&self) -> String {
        self.frames
            .iter()
            .filter_map(|f| f.alias.as_deref())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether a scope enclosing the innermost one can reach `table`.
    pub fn outer_scope_has(&self, table: &str) -> bool {
        let outer = self.frames.len().saturating_sub(1);
        self.frames[..outer]
            .iter()
            .any(|f| f.tables.iter().any(|t| t == table))
    }

    /// Look up `key`, scoped key first, and record its value as the next
    /// positional parameter.
    pub fn push_param(&mut self, key: &str) -> QueryResult<()> {
        let path = self.path();
        let scoped = if path.is_empty() {
            None
        } else {
            Some(format!("{}.{}", path, key))
        };

        let value = scoped
            .as_deref()
            .and_then(|k| self.bindings.get(k))
            .or_else(|| self.bindings.get(key))
            .cloned()
            .ok_or_else(|| QueryError::UnboundParameter(scoped.clone().unwrap_or_else(|| key.to_string())))?;

        tracing::trace!(key, scope = %path, position = self.params.len() + 1, "bind parameter");
        self.params.push(value);
        Ok(())
    }
}
