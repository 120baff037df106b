//! Compile options

use serde::{Deserialize, Serialize};

use crate::error::QueryResult;

/// Options controlling how a query is checked and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileOptions {
    /// Run the static validator before rendering each query level
    #[serde(default = "default_true")]
    pub use_validation: bool,

    /// Render bare column names instead of `table.column`
    #[serde(default)]
    pub one_table: bool,

    /// Join clauses with spaces; otherwise each clause starts a new line
    #[serde(default = "default_true")]
    pub one_line_sql: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_validation: true,
            one_table: false,
            one_line_sql: true,
        }
    }
}

impl CompileOptions {
    /// Create a new options builder
    pub fn builder() -> CompileOptionsBuilder {
        CompileOptionsBuilder::default()
    }

    /// Parse options from a TOML document such as
    ///
    /// ```toml
    /// use_validation = false
    /// one_line_sql = false
    /// ```
    ///
    /// Missing keys keep their defaults; unknown keys are rejected.
    pub fn from_toml(source: &str) -> QueryResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Separator placed between rendered clauses.
    pub fn clause_separator(&self) -> &'static str {
        if self.one_line_sql { " " } else { "\n" }
    }
}

/// Builder for CompileOptions
#[derive(Debug, Default)]
pub struct CompileOptionsBuilder {
    options: CompileOptions,
}

impl CompileOptionsBuilder {
    /// Enable or disable validation
    pub fn validation(mut self, enabled: bool) -> Self {
        self.options.use_validation = enabled;
        self
    }

    /// Render unqualified column names
    pub fn one_table(mut self, enabled: bool) -> Self {
        self.options.one_table = enabled;
        self
    }

    /// Render on one line or one clause per line
    pub fn one_line(mut self, enabled: bool) -> Self {
        self.options.one_line_sql = enabled;
        self
    }

    /// Build the options
    pub fn build(self) -> CompileOptions {
        self.options
    }
}
