//! SELECT SQL generation.

use crate::ast::{Expr, Join, Query, Record, Relation, Source, Union};
use crate::config::CompileOptions;
use crate::error::QueryResult;
use crate::transpiler::conditions::{ExprToSql, render_list};
use crate::transpiler::context::RenderContext;
use crate::validator;

/// Render `query` as one scope level. `alias` is the name the query is
/// known by in its parent (derived table or scalar subquery), if any.
pub fn build_select(
    query: &Query,
    alias: Option<&str>,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    if options.use_validation {
        validator::validate(query)?;
    }

    if query.is_bare_union()
        && let Some(union) = query.from_clause().union()
    {
        ctx.push_scope(alias, Vec::new(), false);
        let sql = build_union(union, ctx, options);
        ctx.pop_scope();
        return sql;
    }

    let tables = query
        .from_clause()
        .relations()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    let bare = query.from_clause().union().is_some();
    ctx.push_scope(alias, tables, bare);
    let sql = build_clauses(query, ctx, options);
    ctx.pop_scope();
    sql
}

fn build_clauses(
    query: &Query,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    let mut parts = Vec::new();

    let select = query.select_clause();
    let keyword = select.kind().keyword();
    if select.is_empty() {
        parts.push(format!("{} *", keyword));
    } else {
        let cols = select
            .items()
            .iter()
            .map(|e| e.to_projection_sql(ctx, options))
            .collect::<QueryResult<Vec<_>>>()?;
        parts.push(format!("{} {}", keyword, cols.join(", ")));
    }

    let from = query.from_clause();
    if !from.is_empty() {
        let sources = from
            .items()
            .iter()
            .map(|s| build_source(s, query, ctx, options))
            .collect::<QueryResult<Vec<_>>>()?;
        parts.push(format!("{} {}", from.kind().keyword(), sources.join(", ")));
    }

    for clause in query.trailing_clauses() {
        if clause.is_empty() {
            continue;
        }
        let items = render_list(clause.items(), ctx, options)?;
        parts.push(format!("{} {}", clause.kind().keyword(), items.join(", ")));
    }

    Ok(parts.join(options.clause_separator()))
}

fn build_source(
    source: &Source,
    owner: &Query,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    match source {
        Source::Relation(rel) => build_relation(rel, ctx, options),
        Source::Join(join) => build_join(join, owner, ctx, options),
        // a union inside a larger query becomes a derived table
        Source::Union(union) => Ok(format!(
            "({}) as {}",
            build_union(union, ctx, options)?,
            owner.internal_name()
        )),
    }
}

fn build_relation(
    rel: &Relation,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    match rel {
        Relation::Table(t) => Ok(t.name().to_string()),
        Relation::Alias(a) => Ok(format!("{} as {}", a.table().name(), a.name())),
        Relation::Derived(d) => Ok(format!(
            "({}) as {}",
            build_select(d.query(), Some(d.name()), ctx, options)?,
            d.name()
        )),
        Relation::Projected(p) => Ok(p.name().to_string()),
    }
}

fn build_join(
    join: &Join,
    owner: &Query,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    let left = build_source(&join.left, owner, ctx, options)?;
    let right = match &join.right {
        Source::Join(_) => format!("({})", build_source(&join.right, owner, ctx, options)?),
        other => build_source(other, owner, ctx, options)?,
    };

    let mut sql = format!("{} {} {}", left, join.kind, right);
    if let Some(on) = Expr::conjunction(join.on.iter().cloned()) {
        sql.push_str(" ON ");
        sql.push_str(&on.to_sql_in(ctx, options)?);
    }
    Ok(sql)
}

fn build_union(
    union: &Union,
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<String> {
    let left = build_select(&union.left, None, ctx, options)?;
    let right = build_select(&union.right, None, ctx, options)?;
    Ok(format!("{} {} {}", left, union.op, right))
}
