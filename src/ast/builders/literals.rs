//! Literal and placeholder builders.

use crate::ast::{Expr, IntoExpr, Value};

/// Constant value node.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::value(value)
}

/// NULL constant.
pub fn null() -> Expr {
    Expr::value(Value::Null)
}

/// Prepared-statement placeholder, bound by `key` at render time.
pub fn param(key: &str) -> Expr {
    Expr::param(key)
}

/// The `*` marker, as in `COUNT(*)`.
pub fn star() -> Expr {
    Expr::star()
}

/// Parenthesized list of expressions, as used on the right of IN.
pub fn list<E: IntoExpr>(items: impl IntoIterator<Item = E>) -> Expr {
    Expr::list(items)
}
