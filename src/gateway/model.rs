use crate::core::{DataAccessError, Record};

/// Explicit mapping between a model type and one table row.
///
/// `to_record` decides the column set and its order: it drives the INSERT
/// column list, the UPDATE assignments and the WHERE clauses the gateway
/// builds for update and delete.
pub trait Model: Clone {
    /// Table the model is stored in.
    const TABLE: &'static str;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> Result<Self, DataAccessError>;
}
