//! Error types for nendo.

use thiserror::Error;

/// The main error type for building, validating and compiling queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Two reachable tables share a name, or a column is not exposed by FROM.
    #[error("Conflict name: '{name}' ({detail})")]
    ConflictName { name: String, detail: String },

    /// A column or table is referenced but not reachable from FROM.
    #[error("Missing name: '{name}' is not reachable from FROM (referenced in {clause})")]
    MissingName { name: String, clause: &'static str },

    /// Union operands expose a different number of output columns.
    #[error("Invalid arity: union operands expose {left} and {right} columns")]
    InvalidArity { left: usize, right: usize },

    /// A native boolean was combined where an expression was required.
    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    /// Lookup of an undeclared field, table or projection.
    #[error("'{owner}' has no attribute '{name}'")]
    UnknownAttribute { owner: String, name: String },

    /// A placeholder key has no bound value.
    #[error("Unbound parameter: '{0}'")]
    UnboundParameter(String),

    /// A binding value cannot be turned into a constant.
    #[error("Invalid binding: {0}")]
    InvalidBinding(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl QueryError {
    /// Create a conflict error.
    pub fn conflict(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ConflictName {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Create a missing name error for the given clause.
    pub fn missing(name: impl Into<String>, clause: &'static str) -> Self {
        Self::MissingName {
            name: name.into(),
            clause,
        }
    }

    /// Create an unknown attribute error.
    pub fn unknown(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Whether this error was raised by the static validator.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ConflictName { .. } | Self::MissingName { .. })
    }
}

/// Result type alias for nendo operations.
pub type QueryResult<T> = Result<T, QueryError>;
