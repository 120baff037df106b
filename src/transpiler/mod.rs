//! SQL compiler for query trees.
//!
//! Rendering is a single pass that produces the SQL text and, as a side
//! effect, collects the value of every placeholder in marker order.

pub mod conditions;
pub mod context;
pub mod dml;

#[cfg(test)]
mod tests;

pub use conditions::ExprToSql;
pub use context::{Bindings, RenderContext};

use crate::ast::{Expr, Query, Value};
use crate::config::CompileOptions;
use crate::error::QueryResult;

/// Trait for converting query trees to SQL strings.
///
/// Placeholders are resolved against an empty set of bindings, so trees that
/// contain any must go through [`render`] instead.
pub trait ToSql {
    /// Convert this node to SQL with the default options.
    fn to_sql(&self) -> QueryResult<String> {
        self.to_sql_with_options(&CompileOptions::default())
    }

    /// Convert this node to SQL.
    fn to_sql_with_options(&self, options: &CompileOptions) -> QueryResult<String>;
}

impl ToSql for Query {
    fn to_sql_with_options(&self, options: &CompileOptions) -> QueryResult<String> {
        let bindings = Bindings::new();
        let mut ctx = RenderContext::new(&bindings);
        compile(self, &mut ctx, options)
    }
}

impl ToSql for Expr {
    fn to_sql_with_options(&self, options: &CompileOptions) -> QueryResult<String> {
        let bindings = Bindings::new();
        let mut ctx = RenderContext::new(&bindings);
        self.to_sql_in(&mut ctx, options)
    }
}

/// Compile `query` into SQL, appending placeholder values to `ctx`.
///
/// Each nested query level is validated before it is rendered when
/// `options.use_validation` is set; nothing is rendered if any level fails.
pub fn compile(
    query: &Query,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    let sql = dml::select::build_select(query, None, ctx, options)?;
    tracing::debug!(
        sql_len = sql.len(),
        params = ctx.params().len(),
        "compiled query"
    );
    Ok(sql)
}

/// Compile `query` with default options, returning the SQL text and the
/// bound values of its placeholders in marker order.
///
/// ```
/// use nendo::prelude::*;
///
/// let t = declare_table("T", ["id", "pt"]);
/// let q = Query::new()
///     .from_([&t])
///     .select([t.c("id")])
///     .where_(t.c("pt").gte(param("lo")) & t.c("pt").lte(param("hi")));
/// let bindings = Bindings::new().bind("lo", 1).bind("hi", 9);
/// let (sql, params) = render(&q, &bindings).unwrap();
/// assert_eq!(sql, "SELECT T.id FROM T WHERE ((T.pt >= ?) AND (T.pt <= ?))");
/// assert_eq!(params, vec![Value::Int(1), Value::Int(9)]);
/// ```
pub fn render(query: &Query, bindings: &Bindings) -> QueryResult<(String, Vec<Value>)> {
    render_with(query, bindings, &CompileOptions::default())
}

/// [`render`] with explicit options.
pub fn render_with(
    query: &Query,
    bindings: &Bindings,
    options: &CompileOptions,
) -> QueryResult<(String, Vec<Value>)> {
    let mut ctx = RenderContext::new(bindings);
    let sql = compile(query, &mut ctx, options)?;
    Ok((sql, ctx.into_params()))
}
