use crate::ast::{Record, Relation, Scope};

/// A reference to one column of one table-like entity.
///
/// `original_name` is the name the owner exposes the column under and is
/// what qualification (`owner.column`) and validation use. The projection
/// name is what a SELECT list emits: the label when the column is aliased,
/// otherwise the original name.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    owner: Relation,
    field: String,
    name: String,
    label: Option<String>,
    correlated: bool,
}

impl Column {
    pub(crate) fn new(owner: Relation, field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner,
            field: field.into(),
            name: name.into(),
            label: None,
            correlated: false,
        }
    }

    pub fn owner(&self) -> &Relation {
        &self.owner
    }

    /// Field of the owner's source this column was looked up by.
    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    pub fn original_name(&self) -> &str {
        &self.name
    }

    pub fn projection_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The same column exposed under `label` in a SELECT list.
    pub fn aliased(&self, label: impl Into<String>) -> Column {
        Column {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    /// Mark this column as referring to an enclosing query's scope.
    pub fn correlated(&self) -> Column {
        Column {
            correlated: true,
            ..self.clone()
        }
    }

    pub fn is_correlated(&self) -> bool {
        self.correlated
    }

    /// Whether this column was reached through an unfolded subquery and
    /// renders as that whole subquery.
    pub fn is_unfolded(&self) -> bool {
        match &self.owner {
            Relation::Projected(p) => matches!(p.scope(), Scope::Unfolded(_)),
            _ => false,
        }
    }

    /// Name of the owning entity, used to qualify this column.
    pub fn owner_name(&self) -> &str {
        self.owner.name()
    }
}
