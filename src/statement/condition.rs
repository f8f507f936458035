/// Leaf predicates and value operands
///
/// A `Condition` is `field relation value`. The value is an `Operand`: either
/// a quoted literal (user data) or a raw expression rendered verbatim
/// (column references, bind placeholders, SQL functions).

use std::fmt;

use crate::core::Value;

/// Receives quoted literals while a statement is rendered and decides how
/// they appear in the SQL text.
pub trait LiteralSink {
    fn literal(&mut self, value: &Value) -> String;
}

/// Writes literals straight into the text, quoted.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineLiterals;

impl LiteralSink for InlineLiterals {
    fn literal(&mut self, value: &Value) -> String {
        value.to_quoted_literal()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Rendered as a string literal, or bound as a parameter when compiled.
    Quoted(Value),
    /// Rendered verbatim.
    Raw(Value),
}

impl Operand {
    pub fn new(value: impl Into<Value>, quote: bool) -> Self {
        if quote {
            Self::Quoted(value.into())
        } else {
            Self::Raw(value.into())
        }
    }

    pub fn quoted(value: impl Into<Value>) -> Self {
        Self::Quoted(value.into())
    }

    pub fn raw(value: impl Into<Value>) -> Self {
        Self::Raw(value.into())
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        match self {
            Self::Quoted(v) | Self::Raw(v) => v,
        }
    }

    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        matches!(self, Self::Quoted(_))
    }

    pub fn render(&self, sink: &mut dyn LiteralSink) -> String {
        match self {
            Self::Quoted(v) => sink.literal(v),
            Self::Raw(v) => v.to_string(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&mut InlineLiterals))
    }
}

/// A single `field relation value` predicate.
///
/// The relation is not checked against a whitelist; whatever is given is
/// written into the SQL as is.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    relation: String,
    value: Operand,
}

impl Condition {
    /// Condition with a quoted value: `field relation 'value'`.
    pub fn new(
        field: impl Into<String>,
        relation: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::with_quoting(field, relation, value, true)
    }

    /// Condition with a raw value: `field relation value`.
    pub fn unquoted(
        field: impl Into<String>,
        relation: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::with_quoting(field, relation, value, false)
    }

    pub fn with_quoting(
        field: impl Into<String>,
        relation: impl Into<String>,
        value: impl Into<Value>,
        quote: bool,
    ) -> Self {
        Self {
            field: field.into(),
            relation: relation.into(),
            value: Operand::new(value, quote),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    #[must_use]
    pub const fn value(&self) -> &Operand {
        &self.value
    }

    pub fn render(&self, sink: &mut dyn LiteralSink) -> String {
        format!("{} {} {}", self.field, self.relation, self.value.render(sink))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&mut InlineLiterals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_condition() {
        assert_eq!(Condition::new("a", "=", "1").to_string(), "a = '1'");
        assert_eq!(Condition::new("age", ">", 30).to_string(), "age > '30'");
    }

    #[test]
    fn test_unquoted_condition() {
        assert_eq!(Condition::unquoted("age", ">", 30).to_string(), "age > 30");
        assert_eq!(
            Condition::unquoted("users.id", "=", "orders.user_id").to_string(),
            "users.id = orders.user_id"
        );
    }

    #[test]
    fn test_relation_rendered_verbatim() {
        let cond = Condition::with_quoting("name", "NOT LIKE", "A%", true);
        assert_eq!(cond.to_string(), "name NOT LIKE 'A%'");
        assert_eq!(cond.relation(), "NOT LIKE");
    }

    #[test]
    fn test_quoted_value_escapes_quotes() {
        assert_eq!(
            Condition::new("name", "=", "O'Brien").to_string(),
            "name = 'O''Brien'"
        );
    }

    #[test]
    fn test_custom_sink_receives_only_quoted_values() {
        struct Collect(Vec<Value>);
        impl LiteralSink for Collect {
            fn literal(&mut self, value: &Value) -> String {
                self.0.push(value.clone());
                "?".to_string()
            }
        }

        let mut sink = Collect(Vec::new());
        assert_eq!(Condition::new("a", "=", 1).render(&mut sink), "a = ?");
        assert_eq!(Condition::unquoted("b", "=", 2).render(&mut sink), "b = 2");
        assert_eq!(sink.0, vec![Value::Integer(1)]);
    }
}
