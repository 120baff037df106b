//! Expression rendering.

use crate::ast::{Column, Expr, ExprKind, Record, Relation, Scope};
use crate::config::CompileOptions;
use crate::error::{QueryError, QueryResult};
use crate::transpiler::context::RenderContext;
use crate::transpiler::dml::select::build_select;

/// Render an expression node into a SQL fragment.
pub trait ExprToSql {
    /// Render in any position other than a SELECT list.
    fn to_sql_in(&self, ctx: &mut RenderContext<'_>, options: &CompileOptions) -> QueryResult<String>;

    /// Render as a SELECT list item: labels are emitted as `expr as label`.
    fn to_projection_sql(
        &self,
        ctx: &mut RenderContext<'_>,
        options: &CompileOptions,
    ) -> QueryResult<String>;
}

impl ExprToSql for Expr {
    fn to_sql_in(&self, ctx: &mut RenderContext<'_>, options: &CompileOptions) -> QueryResult<String> {
        match self.kind() {
            ExprKind::Value(v) => Ok(v.to_string()),
            ExprKind::Param(key) => {
                ctx.push_param(key)?;
                Ok("?".to_string())
            }
            ExprKind::Star => Ok("*".to_string()),
            ExprKind::Column(col) => col.to_sql_in(ctx, options),
            ExprKind::Unary { op, operand } => {
                let inner = operand.to_sql_in(ctx, options)?;
                if op.is_postfix() {
                    Ok(format!("{} {}", inner, op))
                } else {
                    Ok(format!("({} {})", op, inner))
                }
            }
            ExprKind::Binary { op, left, right } => {
                let l = left.to_sql_in(ctx, options)?;
                let r = right.to_sql_in(ctx, options)?;
                Ok(format!("({} {} {})", l, op, r))
            }
            ExprKind::Between { subject, low, high } => {
                let s = subject.to_sql_in(ctx, options)?;
                let lo = low.to_sql_in(ctx, options)?;
                let hi = high.to_sql_in(ctx, options)?;
                Ok(format!("({} BETWEEN {} AND {})", s, lo, hi))
            }
            ExprKind::Function { name, args } => {
                let args = render_list(args, ctx, options)?;
                Ok(format!("{}({})", name.to_uppercase(), args.join(", ")))
            }
            ExprKind::List(items) => {
                let items = render_list(items, ctx, options)?;
                Ok(format!("({})", items.join(", ")))
            }
            ExprKind::Labeled { expr, .. } => expr.to_sql_in(ctx, options),
            ExprKind::Subquery(sub) => {
                let inner = build_select(sub.query(), Some(sub.name()), ctx, options)?;
                Ok(format!("({})", inner))
            }
        }
    }

    fn to_projection_sql(
        &self,
        ctx: &mut RenderContext<'_>,
        options: &CompileOptions,
    ) -> QueryResult<String> {
        match self.kind() {
            ExprKind::Column(col) => col.to_projection_sql(ctx, options),
            ExprKind::Labeled { expr, label } => {
                Ok(format!("{} as {}", expr.to_sql_in(ctx, options)?, label))
            }
            _ => self.to_sql_in(ctx, options),
        }
    }
}

impl ExprToSql for Column {
    fn to_sql_in(&self, ctx: &mut RenderContext<'_>, options: &CompileOptions) -> QueryResult<String> {
        if let Relation::Projected(p) = self.owner()
            && let Scope::Unfolded(sub) = p.scope()
        {
            // the whole subquery, projected onto this one column
            let source_col = p.source().col(self.field())?;
            let inner = sub.query().replace_select([source_col]);
            return Ok(format!("({})", build_select(&inner, Some(sub.name()), ctx, options)?));
        }

        if ctx.is_bare() {
            return Ok(self.projection_name().to_string());
        }

        if self.is_correlated() {
            if options.use_validation && !ctx.outer_scope_has(self.owner_name()) {
                return Err(QueryError::missing(self.owner_name(), "correlated reference"));
            }
            return Ok(qualified(self));
        }

        if options.one_table {
            Ok(self.original_name().to_string())
        } else {
            Ok(qualified(self))
        }
    }

    fn to_projection_sql(
        &self,
        ctx: &mut RenderContext<'_>,
        options: &CompileOptions,
    ) -> QueryResult<String> {
        let base = self.to_sql_in(ctx, options)?;
        match self.label() {
            Some(label) if !ctx.is_bare() => Ok(format!("{} as {}", base, label)),
            _ => Ok(base),
        }
    }
}

fn qualified(col: &Column) -> String {
    format!("{}.{}", col.owner_name(), col.original_name())
}

/// Render each expression in order; parameters are collected left to right.
pub fn render_list(
    items: &[Expr],
    ctx: &mut RenderContext<'_>,
    options: &CompileOptions,
) -> QueryResult<Vec<String>> {
    items.iter().map(|e| e.to_sql_in(ctx, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Record, Value, declare_table, func, list, param};
    use crate::transpiler::Bindings;

    fn sql(expr: &Expr) -> String {
        let bindings = Bindings::new().bind("p", 7);
        let mut ctx = RenderContext::new(&bindings);
        expr.to_sql_in(&mut ctx, &CompileOptions::default()).unwrap()
    }

    #[test]
    fn test_operators() {
        let t = declare_table("T", ["a", "b"]);
        assert_eq!(sql(&(t.c("a") + 1).gt(t.c("b"))), "((T.a + 1) > T.b)");
        assert_eq!(sql(&!t.c("a").eq(3)), "(NOT (T.a = 3))");
        assert_eq!(sql(&t.c("a").ne(Value::Null)), "(T.a IS NOT NULL)");
        assert_eq!(sql(&t.c("a").like("x%")), "(T.a LIKE 'x%')");
        assert_eq!(sql(&t.c("a").rlike("x%")), "('x%' LIKE T.a)");
        assert_eq!(sql(&t.c("a").desc()), "T.a DESC");
    }

    #[test]
    fn test_between_and_functions() {
        let t = declare_table("T", ["a", "lo", "hi"]);
        assert_eq!(
            sql(&t.c("a").between(t.c("lo"), t.c("hi"))),
            "(T.a BETWEEN T.lo AND T.hi)"
        );
        assert_eq!(sql(&func("coalesce", [t.c("a"), t.c("lo")])), "COALESCE(T.a, T.lo)");
        assert_eq!(sql(&t.c("a").not_in(list([1, 2]))), "(T.a NOT IN (1, 2))");
    }

    #[test]
    fn test_param_marker() {
        let t = declare_table("T", ["a"]);
        assert_eq!(sql(&t.c("a").eq(param("p"))), "(T.a = ?)");
    }

    #[test]
    fn test_label_only_in_projection() {
        let t = declare_table("T", ["a"]);
        let bindings = Bindings::new();
        let mut ctx = RenderContext::new(&bindings);
        let opts = CompileOptions::default();
        let labeled = t.c("a").aliased("x");
        assert_eq!(labeled.to_sql_in(&mut ctx, &opts).unwrap(), "T.a");
        assert_eq!(labeled.to_projection_sql(&mut ctx, &opts).unwrap(), "T.a as x");
    }
}
