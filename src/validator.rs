//! Static checks run on a query before it is rendered.
//!
//! Two ordered passes, both purely structural:
//! 1. tables: reachable names are unique and every referenced owner is reachable
//! 2. columns: every SELECT and ON column is exposed by FROM
//!
//! Correlated columns and columns reached through an unfolded subquery belong
//! to another scope and are skipped. A query fed by a union exposes no tables:
//! its SELECT and WHERE columns must be output columns of the union operands,
//! and the column pass has nothing to check. The operands themselves are
//! checked when they are rendered.

use strsim::levenshtein;

use crate::ast::{Column, Query, Record};
use crate::error::{QueryError, QueryResult};

/// Validate `query` with both passes.
pub fn validate(query: &Query) -> QueryResult<()> {
    let validator = Validator::new(query);
    let result = validator
        .validate_tables()
        .and_then(|_| validator.validate_columns());
    if let Err(err) = &result {
        tracing::debug!(query = query.internal_name(), error = %err, "validation failed");
    }
    result
}

/// Validates one query level against its own FROM clause.
#[derive(Debug)]
pub struct Validator<'a> {
    query: &'a Query,
    reachable: Vec<String>,
    union_outputs: Option<Vec<Column>>,
}

impl<'a> Validator<'a> {
    pub fn new(query: &'a Query) -> Self {
        let from = query.from_clause();
        let reachable = from.relations().iter().map(|r| r.name().to_string()).collect();
        let union_outputs = from.union().map(|u| {
            [&u.left, &u.right]
                .iter()
                .flat_map(|q| q.projection())
                .filter_map(|e| e.as_column().cloned())
                .collect()
        });
        Self {
            query,
            reachable,
            union_outputs,
        }
    }

    /// Names of every table-like entity reachable from FROM, duplicates kept.
    pub fn reachable_names(&self) -> &[String] {
        &self.reachable
    }

    /// Unique reachable names, then reachability of SELECT and WHERE owners.
    pub fn validate_tables(&self) -> QueryResult<()> {
        for (i, name) in self.reachable.iter().enumerate() {
            if self.reachable[..i].contains(name) {
                return Err(QueryError::conflict(
                    name,
                    "table appears more than once in FROM; alias one of them",
                ));
            }
        }

        self.check_owners(&self.query.select_clause().props(), "SELECT")?;
        self.check_owners(&self.query.where_clause().props(), "WHERE")
    }

    fn check_owners(&self, columns: &[Column], clause: &'static str) -> QueryResult<()> {
        for col in columns.iter().filter(|c| is_local(c)) {
            let owner = col.owner_name();
            if let Some(outputs) = &self.union_outputs {
                if !outputs.iter().any(|o| same_column(o, col)) {
                    return Err(QueryError::missing(owner, clause));
                }
                continue;
            }
            if !self.reachable.iter().any(|n| n == owner) {
                if let Some(hint) = did_you_mean(owner, &self.reachable) {
                    tracing::debug!(owner, hint = %hint, "owner not reachable from FROM");
                }
                return Err(QueryError::missing(owner, clause));
            }
        }
        Ok(())
    }

    /// Every SELECT and ON column must be exposed by FROM under its original
    /// name.
    pub fn validate_columns(&self) -> QueryResult<()> {
        if self.union_outputs.is_some() {
            return Ok(());
        }

        let from = self.query.from_clause();
        let available = from.projection_names();

        let mut columns = self.query.select_clause().props();
        for on in from.on_predicates() {
            columns.extend(on.props());
        }

        for col in columns.iter().filter(|c| is_local(c)) {
            let name = col.original_name();
            if available.iter().any(|n| n == name) {
                continue;
            }
            let mut detail = format!(
                "column of '{}' is not exposed by FROM; available: {}",
                col.owner_name(),
                available.join(", ")
            );
            if let Some(hint) = did_you_mean(name, &available) {
                detail.push_str(&format!("; did you mean '{}'?", hint));
            }
            return Err(QueryError::conflict(name, detail));
        }
        Ok(())
    }
}

fn is_local(col: &Column) -> bool {
    !col.is_correlated() && !col.is_unfolded()
}

/// Same owner and field; labels do not matter.
fn same_column(a: &Column, b: &Column) -> bool {
    a.owner() == b.owner() && a.original_name() == b.original_name()
}

/// Closest candidate within a length-dependent edit distance.
fn did_you_mean(input: &str, candidates: &[String]) -> Option<String> {
    let threshold = match input.len() {
        0..=2 => 0,
        3..=5 => 2,
        _ => 3,
    };
    candidates
        .iter()
        .map(|c| (levenshtein(input, c), c))
        .filter(|(dist, _)| *dist <= threshold)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, c)| c.clone())
}
