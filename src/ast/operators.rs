use serde::{Deserialize, Serialize};

/// Single-operand operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Prefix NOT
    Not,
    /// Postfix ASC
    Asc,
    /// Postfix DESC
    Desc,
}

impl UnaryOp {
    /// Postfix operators render after their operand, without parentheses.
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::Asc | UnaryOp::Desc)
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "NOT"),
            UnaryOp::Asc => write!(f, "ASC"),
            UnaryOp::Desc => write!(f, "DESC"),
        }
    }
}

/// Binary operators: arithmetic, comparison, boolean and pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Equal (=)
    Eq,
    /// Not equal (<>)
    Ne,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than or equal (<=)
    Lte,
    And,
    Or,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
    ILike,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Is => "IS",
            BinaryOp::IsNot => "IS NOT",
            BinaryOp::In => "IN",
            BinaryOp::NotIn => "NOT IN",
            BinaryOp::Like => "LIKE",
            BinaryOp::ILike => "ILIKE",
        };
        write!(f, "{}", op)
    }
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "JOIN"),
            JoinKind::LeftOuter => write!(f, "LEFT OUTER JOIN"),
            JoinKind::RightOuter => write!(f, "RIGHT OUTER JOIN"),
            JoinKind::FullOuter => write!(f, "FULL OUTER JOIN"),
            JoinKind::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

/// Set operation combining two queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOp {
    Union,
    UnionAll,
}

impl std::fmt::Display for SetOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetOp::Union => write!(f, "UNION"),
            SetOp::UnionAll => write!(f, "UNION ALL"),
        }
    }
}
