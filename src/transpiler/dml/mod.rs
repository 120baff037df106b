//! Statement builders.

pub mod select;
