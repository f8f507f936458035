use std::fmt;
use std::str::FromStr;

use crate::core::DataAccessError;

use super::condition::Condition;
use super::group::{ConditionGroup, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Right,
    Cross,
    Inner,
}

impl JoinKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Cross => "CROSS",
            Self::Inner => "INNER",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a join kind name; anything unknown is an error, never INNER.
impl FromStr for JoinKind {
    type Err = DataAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            "CROSS" => Ok(Self::Cross),
            "INNER" => Ok(Self::Inner),
            _ => Err(DataAccessError::UnsupportedJoin(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// `ON <predicate>`
    On(Predicate),
    /// `USING (<columns>)`
    Using(Vec<String>),
    /// No constraint, e.g. a plain CROSS JOIN
    None,
}

impl From<Predicate> for JoinConstraint {
    fn from(p: Predicate) -> Self {
        Self::On(p)
    }
}

impl From<Condition> for JoinConstraint {
    fn from(c: Condition) -> Self {
        Self::On(c.into())
    }
}

impl From<ConditionGroup> for JoinConstraint {
    fn from(g: ConditionGroup) -> Self {
        Self::On(g.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub kind: JoinKind,
    pub constraint: JoinConstraint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_kind_parse() {
        assert_eq!("left".parse::<JoinKind>().unwrap(), JoinKind::Left);
        assert_eq!(" INNER ".parse::<JoinKind>().unwrap(), JoinKind::Inner);
        assert!(matches!(
            "OUTER".parse::<JoinKind>(),
            Err(DataAccessError::UnsupportedJoin(kind)) if kind == "OUTER"
        ));
    }
}
