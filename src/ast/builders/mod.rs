//! Free-function builders for expression nodes.
//!
//! ```
//! use nendo::prelude::*;
//!
//! let t = declare_table("T", ["id", "pt"]);
//! let q = Query::new()
//!     .from_([&t])
//!     .select([count(star()).labeled("n")])
//!     .where_(t.c("pt").is_in(list([1, 2, 3])));
//! assert_eq!(q.output_names(), ["n"]);
//! ```

mod functions;
mod literals;

pub use functions::*;
pub use literals::*;
