/// Table data gateway
///
/// CRUD for one model type over one table. Reads hand out `Tracked` models
/// and keep a before-image of each; `update` writes the current field set
/// and locates the row by the before-image, so it also works when the
/// primary key itself was edited.

mod filter;
mod model;
mod tracked;

pub use filter::{Filter, Ordering};
pub use model::Model;
pub use tracked::{IdentityToken, Tracked};

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::connection::{Binds, Connection, PreparedStatement};
use crate::core::{DataAccessError, Record};
use crate::evaluator::SqlStatementEvaluator;
use crate::statement::{Condition, ConditionGroup, Statement};

/// Bind prefix for the new values of an UPDATE.
const NEW_PREFIX: &str = "n_";
/// Bind prefix for before-image values in UPDATE and DELETE conditions.
const OLD_PREFIX: &str = "o_";

pub struct TableDataGateway<'c, M, C: Connection> {
    connection: &'c C,
    table: String,
    snapshots: HashMap<IdentityToken, M>,
}

impl<'c, M: Model, C: Connection> TableDataGateway<'c, M, C> {
    /// Gateway over the model's own table.
    pub fn new(connection: &'c C) -> Self {
        Self::with_table(connection, M::TABLE)
    }

    pub fn with_table(connection: &'c C, table: impl Into<String>) -> Self {
        Self {
            connection,
            table: table.into(),
            snapshots: HashMap::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub const fn connection(&self) -> &'c C {
        self.connection
    }

    /// Returns every row matching all filters, in the given order.
    pub fn find_all(
        &mut self,
        filters: &[Filter],
        ordering: &[Ordering],
    ) -> Result<Vec<Tracked<M>>, DataAccessError> {
        let (statement, binds) = self
            .select(filters, ordering)
            .map_err(|e| e.during("find_all"))?;
        let records = self
            .prepare(&statement, &binds)
            .and_then(|mut prepared| prepared.fetch_all(&binds))
            .map_err(|e| e.during("find_all"))?;

        // Hydrate everything before storing any snapshot
        let models = records
            .iter()
            .map(M::from_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.during("find_all"))?;

        let found: Vec<Tracked<M>> = models.into_iter().map(|model| self.track(model)).collect();
        debug!(table = %self.table, rows = found.len(), "find_all");
        Ok(found)
    }

    /// Returns the first row matching all filters, if any.
    pub fn find_one(
        &mut self,
        filters: &[Filter],
        ordering: &[Ordering],
    ) -> Result<Option<Tracked<M>>, DataAccessError> {
        let (statement, binds) = self
            .select(filters, ordering)
            .map_err(|e| e.during("find_one"))?;
        let record = self
            .prepare(&statement, &binds)
            .and_then(|mut prepared| prepared.fetch_one(&binds))
            .map_err(|e| e.during("find_one"))?;

        match record {
            Some(record) => {
                let model = M::from_record(&record).map_err(|e| e.during("find_one"))?;
                Ok(Some(self.track(model)))
            }
            None => Ok(None),
        }
    }

    /// Inserts the model and returns the id the database assigned to the row.
    pub fn create(&self, object: &M) -> Result<i64, DataAccessError> {
        let record = object.to_record();
        let mut statement = Statement::new();
        statement.insert_into(self.table.as_str())?;

        let mut binds = Binds::new();
        for (field, value) in record.iter() {
            let name = bind_name("", field, &binds);
            statement.column(field, format!(":{name}"), false);
            binds.bind(&name, value.clone());
        }

        self.run(&statement, &binds).map_err(|e| e.during("create"))?;
        let id = self.connection.last_insert_id();
        debug!(table = %self.table, id, "created row");
        Ok(id)
    }

    /// Writes the object's current fields to the row its snapshot points at.
    ///
    /// Returns `Ok(false)` without touching the database when the object
    /// was not returned by this gateway. The snapshot is left as it was, so
    /// a second update still targets the originally read values.
    pub fn update(&self, object: &Tracked<M>) -> Result<bool, DataAccessError> {
        let Some(before) = object.token().and_then(|token| self.snapshots.get(&token)) else {
            debug!(table = %self.table, token = ?object.token(), "update skipped: no snapshot");
            return Ok(false);
        };
        let previous = before.to_record();
        let current = object.to_record();

        let mut statement = Statement::new();
        statement.update(self.table.as_str())?;

        let mut binds = Binds::new();
        for (field, value) in current.iter() {
            let name = bind_name(NEW_PREFIX, field, &binds);
            statement.set(field, format!(":{name}"), false);
            binds.bind(&name, value.clone());
        }
        statement.where_(match_record(&previous, &mut binds));

        let affected = self.run(&statement, &binds).map_err(|e| e.during("update"))?;
        debug!(table = %self.table, affected, "updated row");
        Ok(true)
    }

    /// Deletes every row equal to the object's current values and returns
    /// how many rows went away.
    pub fn delete(&self, object: &M) -> Result<usize, DataAccessError> {
        let mut statement = Statement::new();
        statement.delete_from(self.table.as_str())?;

        let mut binds = Binds::new();
        statement.where_(match_record(&object.to_record(), &mut binds));

        let affected = self.run(&statement, &binds).map_err(|e| e.during("delete"))?;
        debug!(table = %self.table, affected, "deleted rows");
        Ok(affected)
    }

    /// Runs a caller-built statement and hydrates every row. Nothing is
    /// snapshotted, so the results cannot be passed to `update`.
    pub fn find_custom(&self, statement: &Statement) -> Result<Vec<M>, DataAccessError> {
        let records = self
            .connection
            .prepare(statement)
            .and_then(|mut prepared| prepared.fetch_all(&Binds::new()))
            .map_err(|e| e.during("find_custom"))?;

        records
            .iter()
            .map(|record| M::from_record(record).map_err(|e| e.during("find_custom")))
            .collect()
    }

    /// Drops the snapshot of an object. Returns whether one existed.
    pub fn forget(&mut self, object: &Tracked<M>) -> bool {
        object
            .token()
            .is_some_and(|token| self.snapshots.remove(&token).is_some())
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn track(&mut self, model: M) -> Tracked<M> {
        let token = IdentityToken::next();
        self.snapshots.insert(token, model.clone());
        trace!(table = %self.table, %token, "snapshot stored");
        Tracked::attached(token, model)
    }

    /// SELECT * with the filters as an AND group of bound conditions.
    fn select(
        &self,
        filters: &[Filter],
        ordering: &[Ordering],
    ) -> Result<(Statement, Binds), DataAccessError> {
        let mut statement = Statement::new();
        statement.from(self.table.as_str())?;

        let mut binds = Binds::new();
        if !filters.is_empty() {
            let mut group = ConditionGroup::and();
            for filter in filters {
                let name = bind_name("", filter.field(), &binds);
                group.add(Condition::unquoted(
                    filter.field(),
                    filter.relation(),
                    format!(":{name}"),
                ));
                binds.bind(&name, filter.value().clone());
            }
            statement.where_(group);
        }
        for order in ordering {
            statement.order_by_dir(order.field(), order.direction());
        }
        Ok((statement, binds))
    }

    /// Prepares a statement; a driver rejection reports the binds it was
    /// going to run with.
    fn prepare(
        &self,
        statement: &Statement,
        binds: &Binds,
    ) -> Result<C::Prepared<'c>, DataAccessError> {
        self.connection.prepare(statement).map_err(|e| match e {
            DataAccessError::Driver { message, sql } => DataAccessError::Execution {
                sql,
                binds: binds.to_string(),
                message,
            },
            other => other,
        })
    }

    fn run(&self, statement: &Statement, binds: &Binds) -> Result<usize, DataAccessError> {
        self.prepare(statement, binds)?.execute(binds)
    }
}

/// AND group matching every column of the record. NULL columns become
/// `IS NULL` since `= NULL` never matches.
fn match_record(record: &Record, binds: &mut Binds) -> ConditionGroup {
    let mut group = ConditionGroup::and();
    for (field, value) in record.iter() {
        let column = SqlStatementEvaluator::quote_identifier(field);
        if value.is_null() {
            group.add(Condition::unquoted(column, "IS", "NULL"));
            continue;
        }
        let name = bind_name(OLD_PREFIX, field, binds);
        group.add(Condition::unquoted(column, "=", format!(":{name}")));
        binds.bind(&name, value.clone());
    }
    group
}

/// Bind name for a field: prefix plus the field with every character that
/// is not alphanumeric or `_` replaced, suffixed `_2`, `_3`... when taken.
fn bind_name(prefix: &str, field: &str, binds: &Binds) -> String {
    let sanitized: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let base = format!("{prefix}{sanitized}");

    let mut name = base.clone();
    let mut suffix = 2;
    while binds.get(&format!(":{name}")).is_some() {
        name = format!("{base}_{suffix}");
        suffix += 1;
    }
    name
}
