/// Statement evaluators
///
/// An evaluator translates a `Statement` into the text of one SQL dialect.
/// `evaluate` inlines quoted literals and is meant for display and
/// diagnostics; `compile` replaces them with named placeholders and hands
/// the values back as binds, which is what a connection executes.

mod sql;

pub use sql::SqlStatementEvaluator;

use serde::Deserialize;

use crate::core::{DataAccessError, Value};
use crate::statement::{LiteralSink, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[default]
    Sqlite,
}

/// SQL text plus the values for its `:_N` literal placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

pub trait StatementEvaluator {
    fn dialect(&self) -> Dialect;

    /// Renders the statement with every literal written into the text.
    fn evaluate(&self, statement: &Statement) -> Result<String, DataAccessError>;

    /// Renders the statement with quoted literals turned into binds.
    fn compile(&self, statement: &Statement) -> Result<CompiledStatement, DataAccessError>;
}

/// Collects quoted literals as numbered named parameters.
#[derive(Debug, Default)]
pub(crate) struct BindCollector {
    params: Vec<(String, Value)>,
}

impl BindCollector {
    pub(crate) fn into_params(self) -> Vec<(String, Value)> {
        self.params
    }
}

impl LiteralSink for BindCollector {
    fn literal(&mut self, value: &Value) -> String {
        let name = format!(":_{}", self.params.len() + 1);
        self.params.push((name.clone(), value.clone()));
        name
    }
}
