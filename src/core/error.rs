use thiserror::Error;

use crate::statement::StatementKind;

#[derive(Error, Debug)]
pub enum DataAccessError {
    // Usage errors raised while building a Statement
    #[error("Statement is already a {current} statement, cannot use it as {requested}")]
    KindConflict {
        current: StatementKind,
        requested: StatementKind,
    },
    #[error("Statement.{method}(): target table is already set to '{table}'")]
    TableAlreadySet { method: &'static str, table: String },
    #[error("No source defined")]
    MissingTable,
    #[error("Retrieving non-existent limit")]
    MissingLimit,
    #[error("Invalid limit parameters: {0}")]
    InvalidLimit(String),

    // Unsupported input for an evaluator
    #[error("Unrecognized statement type")]
    UnrecognizedStatement,
    #[error("Unsupported join type '{0}'")]
    UnsupportedJoin(String),
    #[error("Unsupported sort direction '{0}'")]
    InvalidSortOrder(String),
    #[error("{0} statement has nothing to assign")]
    EmptyAssignment(StatementKind),

    // Execution against the connection
    #[error("Database error: \"{message}\" during {sql}")]
    Driver { message: String, sql: String },
    #[error("Couldn't execute statement {sql} with [{binds}]: {message}")]
    Execution {
        sql: String,
        binds: String,
        message: String,
    },
    #[error("TableDataGateway.{operation}: {source}")]
    Gateway {
        operation: &'static str,
        #[source]
        source: Box<DataAccessError>,
    },

    // Hydration of records into models
    #[error("Column '{0}' not found in record")]
    ColumnNotFound(String),
    #[error("Column '{column}' holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Connection error: {0}")]
    Connection(#[from] rusqlite::Error),
}

impl DataAccessError {
    /// Wraps the error with the name of the gateway operation that failed.
    pub fn during(self, operation: &'static str) -> Self {
        Self::Gateway {
            operation,
            source: Box::new(self),
        }
    }
}
