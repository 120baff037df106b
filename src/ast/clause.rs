use crate::ast::{Column, Env, Expr, Relation, Source, Union};

/// Which part of a query a clause fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Select,
    /// SELECT list of a query used as a derived table; every column carries
    /// a synthetic projection name.
    SubSelect,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
}

impl ClauseKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClauseKind::Select | ClauseKind::SubSelect => "SELECT",
            ClauseKind::From => "FROM",
            ClauseKind::Where => "WHERE",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Having => "HAVING",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
        }
    }

    /// Clauses whose items are folded into a single AND predicate.
    pub fn is_predicate(self) -> bool {
        matches!(self, ClauseKind::Where | ClauseKind::Having)
    }
}

/// An ordered, keyword-labeled list of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause<T> {
    kind: ClauseKind,
    items: Vec<T>,
}

impl<T: Clone> Clause<T> {
    pub fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// A new clause with `items` appended, or replacing the current ones.
    pub fn extended(&self, items: impl IntoIterator<Item = T>, replace: bool) -> Self {
        let mut next = if replace { Vec::new() } else { self.items.clone() };
        next.extend(items);
        Self {
            kind: self.kind,
            items: next,
        }
    }

    /// Same items under another kind.
    pub(crate) fn retagged(&self, kind: ClauseKind) -> Self {
        Self {
            kind,
            items: self.items.clone(),
        }
    }
}

impl Clause<Expr> {
    /// Like [`Clause::extended`], but for WHERE and HAVING the result holds a
    /// single predicate: the existing one AND-ed with the new ones, in order.
    pub fn extended_exprs(&self, items: impl IntoIterator<Item = Expr>, replace: bool) -> Self {
        if !self.kind.is_predicate() {
            return self.extended(items, replace);
        }
        let base = if replace { None } else { self.predicate().cloned() };
        let folded = Expr::conjunction(base.into_iter().chain(items));
        Self {
            kind: self.kind,
            items: folded.into_iter().collect(),
        }
    }

    /// The folded predicate of a WHERE or HAVING clause.
    pub fn predicate(&self) -> Option<&Expr> {
        self.items.first()
    }

    /// Distinct columns referenced by the items.
    pub fn props(&self) -> Vec<Column> {
        let mut out: Vec<Column> = Vec::new();
        for col in self.items.iter().flat_map(Expr::props) {
            if !out.contains(&col) {
                out.push(col);
            }
        }
        out
    }

    pub fn env(&self) -> Env {
        Env::merged(self.items.iter().map(Expr::env))
    }
}

impl Clause<Source> {
    /// Relations reachable from every FROM item, duplicates kept.
    pub fn relations(&self) -> Vec<Relation> {
        self.items.iter().flat_map(Source::relations).collect()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.items.iter().flat_map(Source::columns).collect()
    }

    /// Names FROM exposes columns under. Empty for a union.
    pub fn projection_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|c| c.original_name().to_string())
            .collect()
    }

    pub fn on_predicates(&self) -> Vec<Expr> {
        self.items.iter().flat_map(Source::on_predicates).collect()
    }

    /// The union this clause is fed by, if any.
    pub fn union(&self) -> Option<&Union> {
        self.items.iter().find_map(Source::as_union)
    }
}
