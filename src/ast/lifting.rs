//! Lifting of host values into expression nodes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::ast::expr::invalid_bool;
use crate::ast::{Column, Expr, UnfoldedQuery, Value};
use crate::error::QueryResult;

/// Anything usable as an operand: expression nodes pass through, literals
/// are wrapped into constant-value nodes.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

/// Operands of AND/OR. Same as [`IntoExpr`], except that a native `bool`
/// is refused instead of lifted.
pub trait IntoCondition {
    fn into_condition(self) -> QueryResult<Expr>;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for Column {
    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

impl IntoExpr for &Column {
    fn into_expr(self) -> Expr {
        Expr::from(self.clone())
    }
}

impl IntoExpr for UnfoldedQuery {
    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

impl IntoExpr for &UnfoldedQuery {
    fn into_expr(self) -> Expr {
        Expr::from(self.clone())
    }
}

impl IntoExpr for Value {
    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

macro_rules! lift_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::value(self)
                }
            }
        )*
    };
}

lift_literal!(
    bool,
    i32,
    i64,
    u32,
    f64,
    &str,
    String,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    Uuid,
);

impl<T: Into<Value>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::value(self)
    }
}

impl<T: Into<Value>> IntoExpr for Vec<T> {
    fn into_expr(self) -> Expr {
        Expr::value(self)
    }
}

impl<T: Into<Value>, const N: usize> IntoExpr for [T; N] {
    fn into_expr(self) -> Expr {
        Expr::value(self)
    }
}

impl IntoCondition for bool {
    fn into_condition(self) -> QueryResult<Expr> {
        Err(invalid_bool(self))
    }
}

macro_rules! condition_via_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoCondition for $ty {
                fn into_condition(self) -> QueryResult<Expr> {
                    Ok(self.into_expr())
                }
            }
        )*
    };
}

condition_via_expr!(
    Expr,
    &Expr,
    Column,
    &Column,
    UnfoldedQuery,
    Value,
    i32,
    i64,
    f64,
    &str,
    String,
);
