//! Function-call builders.

use crate::ast::{Expr, IntoExpr};

/// Call `name(args...)`. The name renders upper-cased.
pub fn func<E: IntoExpr>(name: &str, args: impl IntoIterator<Item = E>) -> Expr {
    Expr::function(name, args)
}

/// COUNT(expr)
pub fn count(expr: impl IntoExpr) -> Expr {
    func("count", [expr.into_expr()])
}

/// SUM(expr)
pub fn sum(expr: impl IntoExpr) -> Expr {
    func("sum", [expr.into_expr()])
}

/// AVG(expr)
pub fn avg(expr: impl IntoExpr) -> Expr {
    func("avg", [expr.into_expr()])
}

/// MIN(expr)
pub fn min(expr: impl IntoExpr) -> Expr {
    func("min", [expr.into_expr()])
}

/// MAX(expr)
pub fn max(expr: impl IntoExpr) -> Expr {
    func("max", [expr.into_expr()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Record, declare_table, star};

    #[test]
    fn test_aggregate_keeps_args() {
        let t = declare_table("T", ["id"]);
        let e = max(t.c("id"));
        match e.kind() {
            ExprKind::Function { name, args } => {
                assert_eq!(name, "max");
                assert_eq!(args, &vec![Expr::from(t.c("id"))]);
            }
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(e.props(), vec![t.c("id")]);
        assert!(count(star()).props().is_empty());
    }
}
