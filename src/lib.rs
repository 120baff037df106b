//! # nendo
//!
//! Build relational queries as immutable expression trees and render them to
//! SQL text plus an ordered list of parameter values.
//!
//! ## Quick Example
//!
//! ```
//! use nendo::prelude::*;
//!
//! let t1 = declare_table("T1", ["id"]);
//! let t2 = declare_table("T2", ["id", "t1_id"]);
//!
//! let q = Query::new()
//!     .from_([t1.left_outer_join(&t2, [t2.c("t1_id").eq(t1.c("id"))])])
//!     .select([t1.c("id")])
//!     .where_(t2.c("id").gt(param("min")));
//!
//! let (sql, params) = render(&q, &Bindings::new().bind("min", 10)).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT T1.id FROM T1 LEFT OUTER JOIN T2 ON (T2.t1_id = T1.id) WHERE (T2.id > ?)"
//! );
//! assert_eq!(params, vec![Value::Int(10)]);
//! ```
//!
//! ## Building blocks
//!
//! | Item                 | Role                                         |
//! |----------------------|----------------------------------------------|
//! | [`declare_table`]    | Declares a table and its columns             |
//! | [`Query`]            | Immutable SELECT builder                     |
//! | [`alias()`]          | Renames tables, queries, columns, expressions |
//! | [`subquery`]         | Scalar / correlated form of a query          |
//! | [`render`]           | SQL text plus ordered parameter values       |
//! | [`CompileOptions`]   | Validation and output formatting switches    |

pub mod ast;
pub mod config;
pub mod error;
pub mod transpiler;
pub mod validator;

pub use ast::{Query, Record, Table, Value, alias, declare_table, subquery};
pub use config::CompileOptions;
pub use error::{QueryError, QueryResult};
pub use transpiler::{Bindings, ToSql, compile, render, render_with};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::CompileOptions;
    pub use crate::error::*;
    pub use crate::transpiler::{Bindings, RenderContext, ToSql, compile, render, render_with};
}
