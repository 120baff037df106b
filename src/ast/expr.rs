use std::ops;

use crate::ast::{
    BinaryOp, Column, Env, IntoCondition, IntoExpr, Relation, UnaryOp, UnfoldedQuery, Value,
};
use crate::error::{QueryError, QueryResult};

/// A node of the expression tree.
///
/// The node's placeholder environment is computed once at construction from
/// its children, so every subtree knows which prepared-parameter keys it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    kind: Box<ExprKind>,
    env: Env,
}

/// The closed set of expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constant value
    Value(Value),
    /// Prepared-parameter placeholder, bound by key at render time
    Param(String),
    /// All columns (*)
    Star,
    /// Column reference
    Column(Column),
    /// NOT x, x ASC, x DESC
    Unary { op: UnaryOp, operand: Expr },
    /// left op right
    Binary { op: BinaryOp, left: Expr, right: Expr },
    /// subject BETWEEN low AND high
    Between { subject: Expr, low: Expr, high: Expr },
    /// Function call (COUNT, MAX, ...)
    Function { name: String, args: Vec<Expr> },
    /// Ordered list literal
    List(Vec<Expr>),
    /// Non-column expression exposed under a label (expr as label)
    Labeled { expr: Expr, label: String },
    /// Scalar subquery, rendered as the whole inner query in parentheses
    Subquery(UnfoldedQuery),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        let env = match &kind {
            ExprKind::Value(_) | ExprKind::Star | ExprKind::Column(_) => Env::new(),
            ExprKind::Param(key) => Env::single(key.clone()),
            ExprKind::Unary { operand, .. } => operand.env.clone(),
            ExprKind::Binary { left, right, .. } => Env::merged([&left.env, &right.env]),
            ExprKind::Between { subject, low, high } => {
                Env::merged([&subject.env, &low.env, &high.env])
            }
            ExprKind::Function { args, .. } | ExprKind::List(args) => {
                Env::merged(args.iter().map(|a| &a.env))
            }
            ExprKind::Labeled { expr, .. } => expr.env.clone(),
            ExprKind::Subquery(sub) => sub.query().env(),
        };
        Self {
            kind: Box::new(kind),
            env,
        }
    }

    /// Constant value node.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Value(value.into()))
    }

    /// Placeholder node for a prepared-statement parameter.
    pub fn param(key: impl Into<String>) -> Self {
        Self::new(ExprKind::Param(key.into()))
    }

    /// The `*` marker.
    pub fn star() -> Self {
        Self::new(ExprKind::Star)
    }

    pub fn unary(op: UnaryOp, operand: impl IntoExpr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: operand.into_expr(),
        })
    }

    pub fn binary(op: BinaryOp, left: impl IntoExpr, right: impl IntoExpr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: left.into_expr(),
            right: right.into_expr(),
        })
    }

    pub fn function<E: IntoExpr>(name: impl Into<String>, args: impl IntoIterator<Item = E>) -> Self {
        Self::new(ExprKind::Function {
            name: name.into(),
            args: args.into_iter().map(IntoExpr::into_expr).collect(),
        })
    }

    pub fn list<E: IntoExpr>(items: impl IntoIterator<Item = E>) -> Self {
        Self::new(ExprKind::List(
            items.into_iter().map(IntoExpr::into_expr).collect(),
        ))
    }

    /// Fold predicates left-to-right with AND. `None` when there are none.
    pub fn conjunction(items: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        items.into_iter().reduce(|acc, e| acc & e)
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Placeholder keys used anywhere in this subtree.
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self.kind.as_ref() {
            ExprKind::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Expose this expression under a new name.
    ///
    /// Columns keep their column identity and carry the label; anything else
    /// is wrapped in a labeled node.
    pub fn labeled(self, label: impl Into<String>) -> Expr {
        match *self.kind {
            ExprKind::Column(c) => Expr::from(c.aliased(label)),
            ExprKind::Labeled { expr, .. } => Expr::new(ExprKind::Labeled {
                expr,
                label: label.into(),
            }),
            kind => Expr::new(ExprKind::Labeled {
                expr: Expr {
                    kind: Box::new(kind),
                    env: self.env,
                },
                label: label.into(),
            }),
        }
    }

    /// Name under which a SELECT list exposes this expression, if any.
    pub fn output_name(&self) -> Option<&str> {
        match self.kind.as_ref() {
            ExprKind::Column(c) => Some(c.projection_name()),
            ExprKind::Labeled { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Distinct column references in this subtree, in traversal order.
    ///
    /// Scalar subqueries are a separate scope and contribute nothing.
    pub fn props(&self) -> Vec<Column> {
        let mut out = Vec::new();
        self.collect_props(&mut out);
        out
    }

    fn collect_props(&self, out: &mut Vec<Column>) {
        match self.kind.as_ref() {
            ExprKind::Value(_) | ExprKind::Param(_) | ExprKind::Star | ExprKind::Subquery(_) => {}
            ExprKind::Column(c) => {
                if !out.contains(c) {
                    out.push(c.clone());
                }
            }
            ExprKind::Unary { operand, .. } => operand.collect_props(out),
            ExprKind::Binary { left, right, .. } => {
                left.collect_props(out);
                right.collect_props(out);
            }
            ExprKind::Between { subject, low, high } => {
                subject.collect_props(out);
                low.collect_props(out);
                high.collect_props(out);
            }
            ExprKind::Function { args, .. } | ExprKind::List(args) => {
                for arg in args {
                    arg.collect_props(out);
                }
            }
            ExprKind::Labeled { expr, .. } => expr.collect_props(out),
        }
    }

    /// Distinct table-like entities referenced by this subtree.
    pub fn tables(&self) -> Vec<Relation> {
        let mut out: Vec<Relation> = Vec::new();
        for col in self.props() {
            if !out.contains(col.owner()) {
                out.push(col.owner().clone());
            }
        }
        out
    }

    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Expr {
        Expr::new(ExprKind::Between {
            subject: self,
            low: low.into_expr(),
            high: high.into_expr(),
        })
    }

    /// AND with another condition. Native booleans are rejected.
    pub fn and(self, rhs: impl IntoCondition) -> QueryResult<Expr> {
        Ok(self & rhs.into_condition()?)
    }

    /// OR with another condition. Native booleans are rejected.
    pub fn or(self, rhs: impl IntoCondition) -> QueryResult<Expr> {
        Ok(self | rhs.into_condition()?)
    }

    pub(crate) fn is_null_value(&self) -> bool {
        matches!(self.kind.as_ref(), ExprKind::Value(Value::Null))
    }
}

/// Comparison, pattern and ordering methods shared by every expression-like
/// type. Each operand is lifted with [`IntoExpr`].
macro_rules! impl_expr_ops {
    ($ty:ty) => {
        impl $ty {
            /// `=`; comparing with NULL renders `IS`.
            pub fn eq(self, rhs: impl IntoExpr) -> Expr {
                let rhs = rhs.into_expr();
                let op = if rhs.is_null_value() { BinaryOp::Is } else { BinaryOp::Eq };
                Expr::binary(op, self, rhs)
            }

            /// `<>`; comparing with NULL renders `IS NOT`.
            pub fn ne(self, rhs: impl IntoExpr) -> Expr {
                let rhs = rhs.into_expr();
                let op = if rhs.is_null_value() { BinaryOp::IsNot } else { BinaryOp::Ne };
                Expr::binary(op, self, rhs)
            }

            pub fn gt(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Gt, self, rhs)
            }

            pub fn lt(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Lt, self, rhs)
            }

            pub fn gte(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Gte, self, rhs)
            }

            pub fn lte(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Lte, self, rhs)
            }

            pub fn is_(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Is, self, rhs)
            }

            pub fn is_not(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::IsNot, self, rhs)
            }

            pub fn is_in(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::In, self, rhs)
            }

            pub fn not_in(self, rhs: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::NotIn, self, rhs)
            }

            pub fn like(self, pattern: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Like, self, pattern)
            }

            pub fn ilike(self, pattern: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::ILike, self, pattern)
            }

            /// `pattern LIKE self`
            pub fn rlike(self, pattern: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::Like, pattern, self)
            }

            /// `pattern ILIKE self`
            pub fn rilike(self, pattern: impl IntoExpr) -> Expr {
                Expr::binary(BinaryOp::ILike, pattern, self)
            }

            pub fn asc(self) -> Expr {
                Expr::unary(UnaryOp::Asc, self)
            }

            pub fn desc(self) -> Expr {
                Expr::unary(UnaryOp::Desc, self)
            }
        }

        impl<R: IntoExpr> ops::Add<R> for $ty {
            type Output = Expr;
            fn add(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::Add, self, rhs)
            }
        }

        impl<R: IntoExpr> ops::Sub<R> for $ty {
            type Output = Expr;
            fn sub(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::Sub, self, rhs)
            }
        }

        impl<R: IntoExpr> ops::Mul<R> for $ty {
            type Output = Expr;
            fn mul(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::Mul, self, rhs)
            }
        }

        impl<R: IntoExpr> ops::Div<R> for $ty {
            type Output = Expr;
            fn div(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::Div, self, rhs)
            }
        }

        impl ops::Not for $ty {
            type Output = Expr;
            fn not(self) -> Expr {
                Expr::unary(UnaryOp::Not, self)
            }
        }
    };
}

impl_expr_ops!(Expr);
impl_expr_ops!(Column);

impl Column {
    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Expr {
        self.into_expr().between(low, high)
    }
}

impl ops::BitAnd for Expr {
    type Output = Expr;
    fn bitand(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::And, self, rhs)
    }
}

impl ops::BitOr for Expr {
    type Output = Expr;
    fn bitor(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, self, rhs)
    }
}

impl From<Column> for Expr {
    fn from(col: Column) -> Self {
        Expr::new(ExprKind::Column(col))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::new(ExprKind::Value(value))
    }
}

impl From<UnfoldedQuery> for Expr {
    fn from(sub: UnfoldedQuery) -> Self {
        Expr::new(ExprKind::Subquery(sub))
    }
}

pub(crate) fn invalid_bool(b: bool) -> QueryError {
    QueryError::InvalidCombination(format!(
        "native boolean `{}` used where an expression was required",
        b
    ))
}
