//! Renaming of tables, columns, expressions and queries.
//!
//! Every alias is a new immutable view over an existing entity; the entity
//! itself is never touched, so aliasing the same table or query twice yields
//! two independent views.

use std::sync::Arc;

use crate::ast::{Column, Expr, Query, Record, Table};
use crate::error::{QueryError, QueryResult};

/// A table-like entity a column can belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// A declared table
    Table(Table),
    /// A renamed table (`T as t`)
    Alias(TableAlias),
    /// A table seen through an aliased subquery (`sub_q.T`)
    Projected(ProjectedRecord),
    /// An aliased subquery used as a table
    Derived(DerivedTable),
}

impl Record for Relation {
    fn name(&self) -> &str {
        match self {
            Relation::Table(t) => t.name(),
            Relation::Alias(a) => a.name(),
            Relation::Projected(p) => p.name(),
            Relation::Derived(d) => d.name(),
        }
    }

    fn col(&self, field: &str) -> QueryResult<Column> {
        match self {
            Relation::Table(t) => t.col(field),
            Relation::Alias(a) => a.col(field),
            Relation::Projected(p) => p.col(field),
            Relation::Derived(d) => d.col(field),
        }
    }

    fn columns(&self) -> Vec<Column> {
        match self {
            Relation::Table(t) => t.columns(),
            Relation::Alias(a) => a.columns(),
            Relation::Projected(p) => p.columns(),
            Relation::Derived(d) => d.columns(),
        }
    }
}

impl From<Table> for Relation {
    fn from(t: Table) -> Self {
        Relation::Table(t)
    }
}

impl From<TableAlias> for Relation {
    fn from(a: TableAlias) -> Self {
        Relation::Alias(a)
    }
}

impl From<DerivedTable> for Relation {
    fn from(d: DerivedTable) -> Self {
        Relation::Derived(d)
    }
}

#[derive(Debug, PartialEq)]
struct AliasDef {
    name: String,
    table: Table,
}

/// A table under another name.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    def: Arc<AliasDef>,
}

impl TableAlias {
    pub fn new(table: Table, name: impl Into<String>) -> Self {
        Self {
            def: Arc::new(AliasDef {
                name: name.into(),
                table,
            }),
        }
    }

    /// The aliased table.
    pub fn table(&self) -> &Table {
        &self.def.table
    }
}

impl Record for TableAlias {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn col(&self, field: &str) -> QueryResult<Column> {
        if self.def.table.has_field(field) {
            Ok(Column::new(Relation::Alias(self.clone()), field, field))
        } else {
            Err(QueryError::unknown(&self.def.name, field))
        }
    }

    fn columns(&self) -> Vec<Column> {
        self.def
            .table
            .fields()
            .iter()
            .map(|f| Column::new(Relation::Alias(self.clone()), f, f))
            .collect()
    }
}

/// The query scope a [`ProjectedRecord`] was reached through.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// A derived table in FROM; columns render as `alias.table_column`
    Derived(DerivedTable),
    /// A scalar subquery; columns render as the whole subquery
    Unfolded(UnfoldedQuery),
}

impl Scope {
    pub fn name(&self) -> &str {
        match self {
            Scope::Derived(d) => d.name(),
            Scope::Unfolded(u) => u.name(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct ProjectedDef {
    scope: Scope,
    source: Relation,
    prefix: String,
}

/// A relation nested inside an aliased subquery, re-projected under the
/// subquery's name. Its columns are named `<source>_<column>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRecord {
    def: Arc<ProjectedDef>,
}

impl ProjectedRecord {
    fn new(scope: Scope, source: Relation) -> Self {
        let prefix = format!("{}_", source.name());
        Self {
            def: Arc::new(ProjectedDef {
                scope,
                source,
                prefix,
            }),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.def.scope
    }

    /// The relation inside the subquery this record stands for.
    pub fn source(&self) -> &Relation {
        &self.def.source
    }

    fn project(&self, source_col: &Column) -> Column {
        Column::new(
            Relation::Projected(self.clone()),
            source_col.field(),
            format!("{}{}", self.def.prefix, source_col.original_name()),
        )
    }
}

impl Record for ProjectedRecord {
    fn name(&self) -> &str {
        self.def.scope.name()
    }

    fn col(&self, field: &str) -> QueryResult<Column> {
        let source_col = self.def.source.col(field)?;
        Ok(self.project(&source_col))
    }

    fn columns(&self) -> Vec<Column> {
        self.def
            .source
            .columns()
            .iter()
            .map(|c| self.project(c))
            .collect()
    }
}

#[derive(Debug, PartialEq)]
struct DerivedDef {
    name: String,
    query: Query,
    original: Query,
}

/// A subquery used in FROM as if it were a table.
///
/// The wrapped query is kept in its sub-select form: every projected column
/// carries a `<table>_<column>` label, so columns of different tables joined
/// inside the subquery never collide once flattened into one derived table.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    def: Arc<DerivedDef>,
}

impl DerivedTable {
    pub fn new(query: &Query, name: impl Into<String>) -> Self {
        Self {
            def: Arc::new(DerivedDef {
                name: name.into(),
                query: query.swapped(),
                original: query.clone(),
            }),
        }
    }

    /// The query in sub-select form.
    pub fn query(&self) -> &Query {
        &self.def.query
    }

    /// A table of the inner query, seen from outside (`sub_q.T`).
    pub fn table(&self, name: &str) -> QueryResult<ProjectedRecord> {
        let source = self
            .def
            .query
            .relation(name)
            .map_err(|_| QueryError::unknown(&self.def.name, name))?;
        Ok(ProjectedRecord::new(Scope::Derived(self.clone()), source))
    }

    /// The scalar, correlated-usable form of the same subquery.
    pub fn unfold(&self) -> UnfoldedQuery {
        UnfoldedQuery::new(&self.def.original, Some(self.def.name.as_str()))
    }
}

impl Record for DerivedTable {
    fn name(&self) -> &str {
        &self.def.name
    }

    /// Looks up a projected output column by its projection name.
    fn col(&self, field: &str) -> QueryResult<Column> {
        if self.def.query.output_names().iter().any(|n| n == field) {
            Ok(Column::new(Relation::Derived(self.clone()), field, field))
        } else {
            Err(QueryError::unknown(&self.def.name, field))
        }
    }

    fn columns(&self) -> Vec<Column> {
        self.def
            .query
            .output_names()
            .into_iter()
            .map(|n| Column::new(Relation::Derived(self.clone()), n.clone(), n))
            .collect()
    }
}

#[derive(Debug, PartialEq)]
struct UnfoldedDef {
    name: String,
    query: Query,
}

/// A subquery addressed by its projection rather than its table structure.
///
/// Used as an expression it renders as the whole inner query in
/// parentheses; columns reached through [`UnfoldedQuery::table`] render as
/// the inner query re-projected onto that single column.
#[derive(Debug, Clone, PartialEq)]
pub struct UnfoldedQuery {
    def: Arc<UnfoldedDef>,
}

impl UnfoldedQuery {
    pub fn new(query: &Query, name: Option<&str>) -> Self {
        let name = match name {
            Some(n) => n.to_string(),
            None => query.internal_name().to_string(),
        };
        Self {
            def: Arc::new(UnfoldedDef {
                name,
                query: query.clone(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn query(&self) -> &Query {
        &self.def.query
    }

    pub fn table(&self, name: &str) -> QueryResult<ProjectedRecord> {
        let source = self
            .def
            .query
            .relation(name)
            .map_err(|_| QueryError::unknown(&self.def.name, name))?;
        Ok(ProjectedRecord::new(Scope::Unfolded(self.clone()), source))
    }
}

/// Entities that can be given another name.
pub trait Aliasable {
    type Output;

    fn alias_as(self, name: &str) -> Self::Output;
}

impl Aliasable for Table {
    type Output = TableAlias;

    fn alias_as(self, name: &str) -> TableAlias {
        TableAlias::new(self, name)
    }
}

impl Aliasable for &Table {
    type Output = TableAlias;

    fn alias_as(self, name: &str) -> TableAlias {
        TableAlias::new(self.clone(), name)
    }
}

impl Aliasable for &TableAlias {
    type Output = TableAlias;

    fn alias_as(self, name: &str) -> TableAlias {
        TableAlias::new(self.table().clone(), name)
    }
}

impl Aliasable for &Query {
    type Output = DerivedTable;

    fn alias_as(self, name: &str) -> DerivedTable {
        DerivedTable::new(self, name)
    }
}

impl Aliasable for Query {
    type Output = DerivedTable;

    fn alias_as(self, name: &str) -> DerivedTable {
        DerivedTable::new(&self, name)
    }
}

impl Aliasable for Column {
    type Output = Column;

    fn alias_as(self, name: &str) -> Column {
        self.aliased(name)
    }
}

impl Aliasable for Expr {
    type Output = Expr;

    fn alias_as(self, name: &str) -> Expr {
        self.labeled(name)
    }
}

/// Give an entity another name. Tables become table aliases, queries become
/// derived tables, columns and other expressions become labeled projections.
pub fn alias<A: Aliasable>(entity: A, name: &str) -> A::Output {
    entity.alias_as(name)
}

/// The scalar form of a query, for use in comparisons or IN.
///
/// Without a name the query's generated internal name is used as its scope.
pub fn subquery(query: &Query, name: Option<&str>) -> UnfoldedQuery {
    UnfoldedQuery::new(query, name)
}
