//! FROM sources: plain relations, joins and unions.

use crate::ast::{Column, DerivedTable, Expr, JoinKind, Query, Record, Relation, SetOp, Table, TableAlias};

/// One item of a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Relation(Relation),
    Join(Box<Join>),
    Union(Box<Union>),
}

/// `left KIND right ON predicates`. Multiple predicates are AND-ed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub left: Source,
    pub right: Source,
    pub on: Vec<Expr>,
}

/// `left UNION right`. Both sides expose the same number of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub op: SetOp,
    pub left: Query,
    pub right: Query,
}

impl Source {
    /// Every relation reachable through this source, in left-to-right order.
    /// Duplicates are kept so the validator can report them; a union is
    /// opaque and contributes none.
    pub fn relations(&self) -> Vec<Relation> {
        match self {
            Source::Relation(r) => vec![r.clone()],
            Source::Join(j) => {
                let mut out = j.left.relations();
                out.extend(j.right.relations());
                out
            }
            Source::Union(_) => Vec::new(),
        }
    }

    /// Columns exposed by every reachable relation.
    pub fn columns(&self) -> Vec<Column> {
        self.relations().iter().flat_map(|r| r.columns()).collect()
    }

    /// ON predicates of this source and every nested join, outermost last.
    pub fn on_predicates(&self) -> Vec<Expr> {
        match self {
            Source::Join(j) => {
                let mut out = j.left.on_predicates();
                out.extend(j.right.on_predicates());
                out.extend(j.on.iter().cloned());
                out
            }
            _ => Vec::new(),
        }
    }

    pub fn as_union(&self) -> Option<&Union> {
        match self {
            Source::Union(u) => Some(u),
            _ => None,
        }
    }
}

/// Entities that can sit on either side of a join.
///
/// Joins never modify their operands: each call produces a new [`Join`]
/// that can itself be joined further.
pub trait Joinable {
    fn to_source(&self) -> Source;

    fn join_with<E>(&self, kind: JoinKind, other: impl Into<Source>, on: E) -> Join
    where
        E: IntoIterator<Item = Expr>,
    {
        Join {
            kind,
            left: self.to_source(),
            right: other.into(),
            on: on.into_iter().collect(),
        }
    }

    fn join(&self, other: impl Into<Source>, on: impl IntoIterator<Item = Expr>) -> Join {
        self.join_with(JoinKind::Inner, other, on)
    }

    fn left_outer_join(&self, other: impl Into<Source>, on: impl IntoIterator<Item = Expr>) -> Join {
        self.join_with(JoinKind::LeftOuter, other, on)
    }

    fn right_outer_join(
        &self,
        other: impl Into<Source>,
        on: impl IntoIterator<Item = Expr>,
    ) -> Join {
        self.join_with(JoinKind::RightOuter, other, on)
    }

    fn full_outer_join(&self, other: impl Into<Source>, on: impl IntoIterator<Item = Expr>) -> Join {
        self.join_with(JoinKind::FullOuter, other, on)
    }

    fn cross_join(&self, other: impl Into<Source>, on: impl IntoIterator<Item = Expr>) -> Join {
        self.join_with(JoinKind::Cross, other, on)
    }
}

impl Joinable for Table {
    fn to_source(&self) -> Source {
        Source::Relation(Relation::Table(self.clone()))
    }
}

impl Joinable for TableAlias {
    fn to_source(&self) -> Source {
        Source::Relation(Relation::Alias(self.clone()))
    }
}

impl Joinable for DerivedTable {
    fn to_source(&self) -> Source {
        Source::Relation(Relation::Derived(self.clone()))
    }
}

impl Joinable for Relation {
    fn to_source(&self) -> Source {
        Source::Relation(self.clone())
    }
}

impl Joinable for Join {
    fn to_source(&self) -> Source {
        Source::Join(Box::new(self.clone()))
    }
}

impl Joinable for Source {
    fn to_source(&self) -> Source {
        self.clone()
    }
}

macro_rules! source_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Source {
                fn from(v: $ty) -> Self {
                    v.to_source()
                }
            }

            impl From<&$ty> for Source {
                fn from(v: &$ty) -> Self {
                    v.to_source()
                }
            }
        )*
    };
}

source_from!(Table, TableAlias, DerivedTable, Relation, Join);

impl From<Union> for Source {
    fn from(u: Union) -> Self {
        Source::Union(Box::new(u))
    }
}
