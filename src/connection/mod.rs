/// Connection service
///
/// The gateway never talks to a driver directly. It hands statements to a
/// `Connection`, which renders them through its evaluator, prepares them,
/// and executes the prepared handle with the gateway's named binds.

mod sqlite;

pub use sqlite::{SqliteConnection, SqlitePrepared};

use std::fmt;

use crate::core::{DataAccessError, Record, Value};
use crate::evaluator::StatementEvaluator;
use crate::statement::Statement;

/// Named parameter values for a prepared statement. Names carry the leading `:`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binds(Vec<(String, Value)>);

impl Binds {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Binds a value; the `:` prefix is added when missing.
    pub fn bind(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> &mut Self {
        let name = name.as_ref();
        let name = if name.starts_with(':') {
            name.to_string()
        } else {
            format!(":{name}")
        };
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<(String, Value)> for Binds {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.bind(name, value);
        }
    }
}

impl From<Vec<(String, Value)>> for Binds {
    fn from(params: Vec<(String, Value)>) -> Self {
        let mut binds = Self::new();
        binds.extend(params);
        binds
    }
}

impl fmt::Display for Binds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| match value {
                Value::Text(_) => format!("{name}={}", value.to_quoted_literal()),
                other => format!("{name}={other}"),
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// A statement compiled and prepared by the driver, ready to run with binds.
pub trait PreparedStatement {
    /// The compiled SQL text.
    fn sql(&self) -> &str;

    /// Runs a statement that returns no rows and reports the affected row count.
    fn execute(&mut self, binds: &Binds) -> Result<usize, DataAccessError>;

    fn fetch_all(&mut self, binds: &Binds) -> Result<Vec<Record>, DataAccessError>;

    fn fetch_one(&mut self, binds: &Binds) -> Result<Option<Record>, DataAccessError> {
        Ok(self.fetch_all(binds)?.into_iter().next())
    }
}

pub trait Connection {
    type Prepared<'c>: PreparedStatement
    where
        Self: 'c;

    fn evaluator(&self) -> &dyn StatementEvaluator;

    /// Compiles the statement and prepares it with the driver.
    fn prepare(&self, statement: &Statement) -> Result<Self::Prepared<'_>, DataAccessError>;

    /// Prepares and runs a statement without binds, returning every row.
    fn query(&self, statement: &Statement) -> Result<Vec<Record>, DataAccessError> {
        self.prepare(statement)?.fetch_all(&Binds::new())
    }

    /// Row id assigned by the most recent successful INSERT.
    fn last_insert_id(&self) -> i64;

    /// Builds the error reported when the driver rejects a statement.
    fn catch_error(&self, statement: &Statement, cause: &dyn fmt::Display) -> DataAccessError {
        let sql = self
            .evaluator()
            .evaluate(statement)
            .unwrap_or_else(|e| format!("<unrenderable statement: {e}>"));
        DataAccessError::Driver {
            message: cause.to_string(),
            sql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_prefix_and_replace() {
        let mut binds = Binds::new();
        binds.bind("name", "Bob").bind(":age", 30).bind("name", "Ann");

        assert_eq!(binds.len(), 2);
        assert_eq!(binds.get(":name"), Some(&Value::from("Ann")));
        assert_eq!(binds.to_string(), ":name='Ann', :age=30");
    }
}
