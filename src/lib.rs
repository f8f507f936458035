// tablegate - statement model, SQL evaluator and table data gateway
// Layered: core values -> statement tree -> evaluator -> connection -> gateway

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::cast_precision_loss)]

// Values, records and the crate error type
pub mod core;

// Predicate tree and the Statement builder
pub mod statement;

// Statement -> SQL text compilers
pub mod evaluator;

// Connection service (prepare/execute/fetch) and the SQLite driver
pub mod connection;

// Per-entity CRUD with snapshot tracking
pub mod gateway;

// Settings loading (file + environment)
pub mod settings;

pub use crate::core::{DataAccessError, FromValue, Record, Value};
pub use statement::{
    Condition, ConditionGroup, JoinConstraint, JoinKind, JoinOperator, Predicate, SortOrder,
    Statement, StatementKind,
};
pub use evaluator::{CompiledStatement, Dialect, SqlStatementEvaluator, StatementEvaluator};
pub use connection::{Binds, Connection, PreparedStatement, SqliteConnection};
pub use gateway::{Filter, IdentityToken, Model, Ordering, TableDataGateway, Tracked};
pub use settings::{DatabaseSettings, Settings};
