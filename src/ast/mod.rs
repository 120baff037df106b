//! Expression trees, tables, aliases and the query builder.

pub mod alias;
pub mod builders;
pub mod clause;
pub mod env;
pub mod expr;
pub mod joins;
pub mod lifting;
pub mod operators;
pub mod property;
pub mod query;
pub mod record;
pub mod values;

pub use alias::{
    Aliasable, DerivedTable, ProjectedRecord, Relation, Scope, TableAlias, UnfoldedQuery, alias,
    subquery,
};
pub use builders::*;
pub use clause::{Clause, ClauseKind};
pub use env::Env;
pub use expr::{Expr, ExprKind};
pub use joins::{Join, Joinable, Source, Union};
pub use lifting::{IntoCondition, IntoExpr};
pub use operators::{BinaryOp, JoinKind, SetOp, UnaryOp};
pub use property::Column;
pub use query::Query;
pub use record::{Record, Table, declare_table};
pub use values::Value;
