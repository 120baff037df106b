//! The immutable query builder.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::{
    Clause, ClauseKind, Column, Env, Expr, ExprKind, IntoExpr, Record, Relation, SetOp, Source,
    Union,
};
use crate::error::{QueryError, QueryResult};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);

/// A SELECT query: one clause of each kind.
///
/// Every builder method returns a new query and leaves the receiver as it
/// was, so a partially built query can be shared and extended in several
/// directions.
///
/// ```
/// use nendo::prelude::*;
///
/// let t = declare_table("T", ["id", "pt"]);
/// let q = Query::new().from_([&t]).select([t.c("id")]);
/// let filtered = q.where_(t.c("pt").eq(3));
/// assert_ne!(q, filtered);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    select: Clause<Expr>,
    from: Clause<Source>,
    where_: Clause<Expr>,
    group_by: Clause<Expr>,
    having: Clause<Expr>,
    order_by: Clause<Expr>,
    limit: Clause<Expr>,
    internal_name: OnceLock<String>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.select == other.select
            && self.from == other.from
            && self.where_ == other.where_
            && self.group_by == other.group_by
            && self.having == other.having
            && self.order_by == other.order_by
            && self.limit == other.limit
    }
}

fn lift<E: IntoExpr>(items: impl IntoIterator<Item = E>) -> Vec<Expr> {
    items.into_iter().map(IntoExpr::into_expr).collect()
}

impl Query {
    /// An empty query.
    pub fn new() -> Self {
        Self {
            select: Clause::new(ClauseKind::Select),
            from: Clause::new(ClauseKind::From),
            where_: Clause::new(ClauseKind::Where),
            group_by: Clause::new(ClauseKind::GroupBy),
            having: Clause::new(ClauseKind::Having),
            order_by: Clause::new(ClauseKind::OrderBy),
            limit: Clause::new(ClauseKind::Limit),
            internal_name: OnceLock::new(),
        }
    }

    /// A copy that will get its own internal name.
    fn rebuild(&self) -> Query {
        Query {
            internal_name: OnceLock::new(),
            ..self.clone()
        }
    }

    pub fn select<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.select = self.select.extended_exprs(lift(items), false);
        q
    }

    pub fn replace_select<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.select = self.select.extended_exprs(lift(items), true);
        q
    }

    pub fn from_<S: Into<Source>>(&self, items: impl IntoIterator<Item = S>) -> Query {
        let mut q = self.rebuild();
        q.from = self.from.extended(items.into_iter().map(Into::into), false);
        q
    }

    pub fn replace_from<S: Into<Source>>(&self, items: impl IntoIterator<Item = S>) -> Query {
        let mut q = self.rebuild();
        q.from = self.from.extended(items.into_iter().map(Into::into), true);
        q
    }

    /// AND `predicate` onto the WHERE clause.
    pub fn where_(&self, predicate: Expr) -> Query {
        self.where_all([predicate])
    }

    /// AND every predicate onto the WHERE clause, left to right.
    pub fn where_all(&self, predicates: impl IntoIterator<Item = Expr>) -> Query {
        let mut q = self.rebuild();
        q.where_ = self.where_.extended_exprs(predicates, false);
        q
    }

    pub fn replace_where(&self, predicate: Expr) -> Query {
        let mut q = self.rebuild();
        q.where_ = self.where_.extended_exprs([predicate], true);
        q
    }

    pub fn group_by<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.group_by = self.group_by.extended_exprs(lift(items), false);
        q
    }

    pub fn replace_group_by<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.group_by = self.group_by.extended_exprs(lift(items), true);
        q
    }

    pub fn having(&self, predicate: Expr) -> Query {
        self.having_all([predicate])
    }

    pub fn having_all(&self, predicates: impl IntoIterator<Item = Expr>) -> Query {
        let mut q = self.rebuild();
        q.having = self.having.extended_exprs(predicates, false);
        q
    }

    pub fn replace_having(&self, predicate: Expr) -> Query {
        let mut q = self.rebuild();
        q.having = self.having.extended_exprs([predicate], true);
        q
    }

    pub fn order_by<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.order_by = self.order_by.extended_exprs(lift(items), false);
        q
    }

    pub fn replace_order_by<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.order_by = self.order_by.extended_exprs(lift(items), true);
        q
    }

    /// LIMIT items, rendered comma separated (`LIMIT 10` or `LIMIT 20, 10`).
    pub fn limit<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.limit = self.limit.extended_exprs(lift(items), false);
        q
    }

    pub fn replace_limit<E: IntoExpr>(&self, items: impl IntoIterator<Item = E>) -> Query {
        let mut q = self.rebuild();
        q.limit = self.limit.extended_exprs(lift(items), true);
        q
    }

    /// `self UNION other`. Fails if the two sides expose a different number
    /// of columns.
    pub fn union(&self, other: &Query) -> QueryResult<Query> {
        self.combine(SetOp::Union, other)
    }

    /// `self UNION ALL other`.
    pub fn union_all(&self, other: &Query) -> QueryResult<Query> {
        self.combine(SetOp::UnionAll, other)
    }

    fn combine(&self, op: SetOp, other: &Query) -> QueryResult<Query> {
        let (left, right) = (self.arity(), other.arity());
        if left != right {
            tracing::debug!(left, right, op = %op, "union operands differ in arity");
            return Err(QueryError::InvalidArity { left, right });
        }
        Ok(Query::new().from_([Union {
            op,
            left: self.clone(),
            right: other.clone(),
        }]))
    }

    pub fn select_clause(&self) -> &Clause<Expr> {
        &self.select
    }

    pub fn from_clause(&self) -> &Clause<Source> {
        &self.from
    }

    pub fn where_clause(&self) -> &Clause<Expr> {
        &self.where_
    }

    pub fn group_by_clause(&self) -> &Clause<Expr> {
        &self.group_by
    }

    pub fn having_clause(&self) -> &Clause<Expr> {
        &self.having
    }

    pub fn order_by_clause(&self) -> &Clause<Expr> {
        &self.order_by
    }

    pub fn limit_clause(&self) -> &Clause<Expr> {
        &self.limit
    }

    /// Expression clauses after FROM, in rendering order.
    pub fn trailing_clauses(&self) -> [&Clause<Expr>; 5] {
        [
            &self.where_,
            &self.group_by,
            &self.having,
            &self.order_by,
            &self.limit,
        ]
    }

    /// Whether this query is nothing but a union of two others.
    pub fn is_bare_union(&self) -> bool {
        self.from.len() == 1
            && self.from.union().is_some()
            && self.select.is_empty()
            && self.trailing_clauses().iter().all(|c| c.is_empty())
    }

    /// What the query outputs: the SELECT list, or every FROM column when
    /// nothing is selected. A union exposes its left side's projection.
    pub fn projection(&self) -> Vec<Expr> {
        if !self.select.is_empty() {
            return self.select.items().to_vec();
        }
        match self.from.union() {
            Some(u) => u.left.projection(),
            None => self.from.columns().into_iter().map(Expr::from).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.projection().len()
    }

    /// Columns the query touches in its projection: the explicit SELECT list,
    /// or every column reachable through FROM.
    pub fn props(&self) -> Vec<Column> {
        if self.select.is_empty() {
            self.from.columns()
        } else {
            self.select.props()
        }
    }

    /// Projection names of the output columns.
    pub fn output_names(&self) -> Vec<String> {
        self.projection()
            .iter()
            .filter_map(|e| e.output_name().map(str::to_string))
            .collect()
    }

    /// Output column with the given projection name.
    pub fn col(&self, name: &str) -> QueryResult<Column> {
        self.projection()
            .iter()
            .filter_map(Expr::as_column)
            .find(|c| c.projection_name() == name)
            .cloned()
            .ok_or_else(|| QueryError::unknown(self.internal_name(), name))
    }

    /// Every placeholder key used anywhere in the query, nested queries
    /// included.
    pub fn env(&self) -> Env {
        let mut envs = vec![self.select.env()];
        envs.extend(self.from.items().iter().map(source_env));
        envs.extend(self.trailing_clauses().iter().map(|c| c.env()));
        Env::merged(envs.iter())
    }

    /// Generated unique name, assigned on first use.
    pub fn internal_name(&self) -> &str {
        self.internal_name
            .get_or_init(|| format!("_q{}", NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)))
    }

    /// The FROM-reachable relation called `name`.
    pub fn relation(&self, name: &str) -> QueryResult<Relation> {
        self.from
            .relations()
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| QueryError::unknown(self.internal_name(), name))
    }

    /// Run the static table and column checks.
    pub fn validate(&self) -> QueryResult<()> {
        crate::validator::validate(self)
    }

    /// Sub-select form used when this query becomes a derived table: the
    /// projection is spelled out and every unlabeled column is labeled
    /// `<table>_<column>`.
    ///
    /// Over a union the columns are read back by the names the union
    /// outputs, so the synthetic label wraps the column instead of
    /// replacing its name.
    pub(crate) fn swapped(&self) -> Query {
        let union_fed = self.from.union().is_some();
        let items: Vec<Expr> = self
            .projection()
            .into_iter()
            .map(|e| {
                let Some(c) = e.as_column().filter(|c| c.label().is_none()) else {
                    return e;
                };
                let label = format!("{}_{}", c.owner_name(), c.original_name());
                if union_fed {
                    Expr::new(ExprKind::Labeled {
                        expr: Expr::from(c.clone()),
                        label,
                    })
                } else {
                    Expr::from(c.aliased(label))
                }
            })
            .collect();
        let mut q = self.rebuild();
        q.select = self.select.extended(items, true).retagged(ClauseKind::SubSelect);
        q
    }
}

fn source_env(source: &Source) -> Env {
    match source {
        Source::Relation(Relation::Derived(d)) => d.query().env(),
        Source::Relation(_) => Env::new(),
        Source::Join(j) => {
            let mut envs = vec![source_env(&j.left), source_env(&j.right)];
            envs.extend(j.on.iter().map(|e| e.env().clone()));
            Env::merged(envs.iter())
        }
        Source::Union(u) => Env::merged([&u.left.env(), &u.right.env()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Joinable, alias, declare_table, param};

    #[test]
    fn test_builders_do_not_mutate() {
        let t = declare_table("T", ["id", "pt"]);
        let q = Query::new().from_([&t]);
        let a = q.select([t.c("id")]);
        let b = q.select([t.c("id")]);
        assert_ne!(q, a);
        assert_eq!(a, b);
        assert!(q.select_clause().is_empty());
        assert_eq!(a.select_clause().len(), 1);
    }

    #[test]
    fn test_replace_select() {
        let t = declare_table("T", ["id", "pt"]);
        let q = Query::new().from_([&t]).select([t.c("id")]);
        let r = q.replace_select([t.c("pt")]);
        assert_eq!(r.select_clause().items(), &[Expr::from(t.c("pt"))]);
        assert_eq!(q.select([t.c("pt")]).select_clause().len(), 2);
    }

    #[test]
    fn test_where_calls_fold() {
        let t = declare_table("T", ["a", "b"]);
        let q = Query::new().from_([&t]);
        let one = q.where_(t.c("a").eq(1)).where_(t.c("b").eq(2));
        let all = q.where_all([t.c("a").eq(1), t.c("b").eq(2)]);
        let manual = q.where_(t.c("a").eq(1) & t.c("b").eq(2));
        assert_eq!(one, all);
        assert_eq!(all, manual);
    }

    #[test]
    fn test_props_fall_back_to_from() {
        let t = declare_table("T", ["id", "pt"]);
        let q = Query::new().from_([&t]);
        assert_eq!(q.props(), vec![t.c("id"), t.c("pt")]);
        assert_eq!(q.select([t.c("pt")]).props(), vec![t.c("pt")]);
        assert_eq!(q.output_names(), ["id", "pt"]);
    }

    #[test]
    fn test_internal_name_memoized_and_fresh_per_build() {
        let t = declare_table("T", ["id"]);
        let q = Query::new().from_([&t]);
        let name = q.internal_name().to_string();
        assert_eq!(q.internal_name(), name);
        assert!(name.starts_with("_q"));
        assert_ne!(q.select([t.c("id")]).internal_name(), name);
    }

    #[test]
    fn test_union_arity_checked_eagerly() {
        let t = declare_table("T", ["id", "pt"]);
        let g = declare_table("G", ["id"]);
        let a = Query::new().from_([&t]).select([t.c("id"), t.c("pt")]);
        let b = Query::new().from_([&g]).select([g.c("id")]);
        let err = a.union(&b).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArity { left: 2, right: 1 }));

        let u = a.union_all(&a).unwrap();
        assert!(u.is_bare_union());
        assert_eq!(u.arity(), 2);
        assert_eq!(u.col("pt").unwrap(), t.c("pt"));
        assert!(u.col("missing").is_err());
    }

    #[test]
    fn test_env_collects_nested_queries() {
        let t = declare_table("T", ["id", "pt"]);
        let g = declare_table("G", ["id"]);
        let inner = Query::new().from_([&g]).where_(g.c("id").eq(param("inner")));
        let sub = alias(&inner, "sub");
        let q = Query::new()
            .from_([t.join(&sub, [t.c("id").eq(sub.c("G_id"))])])
            .where_(t.c("pt").gt(param("outer")));
        assert_eq!(q.env().keys().collect::<Vec<_>>(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_swapped_labels_columns() {
        let t = declare_table("T", ["id", "pt"]);
        let q = Query::new()
            .from_([&t])
            .select([Expr::from(t.c("id")), Expr::from(alias(t.c("pt"), "kept"))]);
        let s = q.swapped();
        assert_eq!(s.select_clause().kind(), ClauseKind::SubSelect);
        assert_eq!(s.output_names(), ["T_id", "kept"]);

        let implicit = Query::new().from_([&t]).swapped();
        assert_eq!(implicit.output_names(), ["T_id", "T_pt"]);
    }

    #[test]
    fn test_swapped_union_keeps_column_names() {
        let t = declare_table("T", ["id"]);
        let g = declare_table("G", ["id"]);
        let a = Query::new().from_([&t]).select([t.c("id")]);
        let b = Query::new().from_([&g]).select([g.c("id")]);
        let s = a.union(&b).unwrap().swapped();

        assert_eq!(s.output_names(), ["T_id"]);
        let item = &s.select_clause().items()[0];
        assert!(item.as_column().is_none());
        assert_eq!(item.props(), vec![t.c("id")]);
    }
}
