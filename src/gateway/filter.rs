use crate::core::Value;
use crate::statement::SortOrder;

/// A `field <relation> value` restriction for gateway reads. The value is
/// always passed as a bind, never written into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    relation: String,
    value: Value,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        relation: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            relation: relation.into(),
            value: value.into(),
        }
    }

    /// Shorthand for an `=` filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, "=", value)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    field: String,
    direction: SortOrder,
}

impl Ordering {
    pub fn new(field: impl Into<String>, direction: SortOrder) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub const fn direction(&self) -> SortOrder {
        self.direction
    }
}
