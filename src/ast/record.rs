use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::{Column, Relation, TableAlias};
use crate::error::{QueryError, QueryResult};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Anything that exposes named columns: tables, aliases and derived tables.
pub trait Record {
    /// Name the record is addressed by when qualifying columns.
    fn name(&self) -> &str;

    /// Column handle for `field`, or `UnknownAttribute` if there is none.
    fn col(&self, field: &str) -> QueryResult<Column>;

    /// Every column in declaration order.
    fn columns(&self) -> Vec<Column>;

    /// Shorthand for `col(field)` when the field is fixed at the call site,
    /// as in schema declarations and tests.
    ///
    /// Field names that come from input should go through [`Record::col`]
    /// and `?`: this crate never calls `c` outside its tests.
    ///
    /// # Panics
    ///
    /// Panics with the `UnknownAttribute` message if the record has no such
    /// field.
    fn c(&self, field: &str) -> Column {
        match self.col(field) {
            Ok(col) => col,
            Err(err) => panic!("{}", err),
        }
    }
}

#[derive(Debug)]
struct TableDef {
    id: u64,
    name: String,
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

/// A declared relation: a name plus an ordered set of fields.
///
/// Tables compare by identity. Declaring two tables with the same name
/// yields two distinct entities.
#[derive(Debug, Clone)]
pub struct Table {
    def: Arc<TableDef>,
}

/// Declare a table with the given fields.
pub fn declare_table<I, S>(name: impl Into<String>, fields: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names = Vec::new();
    let mut index = HashMap::new();
    for field in fields {
        let field = field.into();
        if !index.contains_key(&field) {
            index.insert(field.clone(), names.len());
            names.push(field);
        }
    }
    Table {
        def: Arc::new(TableDef {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            fields: names,
            index,
        }),
    }
}

impl Table {
    /// Declare a table from a field template such as `"id, name"` or `"id name"`.
    pub fn from_template(name: impl Into<String>, template: &str) -> Table {
        declare_table(
            name,
            template
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn fields(&self) -> &[String] {
        &self.def.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.def.index.contains_key(field)
    }

    /// A renamed view of this table.
    pub fn alias(&self, name: impl Into<String>) -> TableAlias {
        TableAlias::new(self.clone(), name)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.def.id == other.def.id
    }
}

impl Eq for Table {}

impl Record for Table {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn col(&self, field: &str) -> QueryResult<Column> {
        if self.has_field(field) {
            Ok(Column::new(Relation::Table(self.clone()), field, field))
        } else {
            Err(QueryError::unknown(&self.def.name, field))
        }
    }

    fn columns(&self) -> Vec<Column> {
        self.def
            .fields
            .iter()
            .map(|f| Column::new(Relation::Table(self.clone()), f, f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_fields() {
        let t = Table::from_template("T", "id, name  t_id");
        assert_eq!(t.fields(), &["id", "name", "t_id"]);
        assert_eq!(t.name(), "T");
    }

    #[test]
    fn test_identity_not_name() {
        let a = declare_table("T", ["id"]);
        let b = declare_table("T", ["id"]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a.c("id"), b.c("id"));
    }

    #[test]
    fn test_unknown_field() {
        let t = declare_table("T", ["id"]);
        let err = t.col("nope").unwrap_err();
        assert!(matches!(err, QueryError::UnknownAttribute { .. }));
        assert_eq!(t.columns(), vec![t.c("id")]);
    }

    #[test]
    #[should_panic(expected = "nope")]
    fn test_shorthand_panics_on_unknown_field() {
        let t = declare_table("T", ["id"]);
        t.c("nope");
    }
}
