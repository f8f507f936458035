/// SQLite connection service
///
/// Wraps a `rusqlite::Connection`. Statements are compiled with the SQLite
/// dialect, so quoted literals travel as `:_N` parameters next to the
/// gateway's own named binds.

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{OpenFlags, ToSql};
use tracing::debug;

use crate::core::{DataAccessError, Record, Value};
use crate::evaluator::{CompiledStatement, SqlStatementEvaluator, StatementEvaluator};
use crate::settings::DatabaseSettings;
use crate::statement::Statement;

use super::{Binds, Connection, PreparedStatement};

const IN_MEMORY: &str = ":memory:";

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Self::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

pub struct SqliteConnection {
    inner: rusqlite::Connection,
    evaluator: SqlStatementEvaluator,
}

impl SqliteConnection {
    /// Opens the database described by the settings. A path of `:memory:`
    /// opens a private in-memory database.
    pub fn open(settings: &DatabaseSettings) -> Result<Self, DataAccessError> {
        if settings.path == IN_MEMORY {
            return Self::open_in_memory();
        }

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if settings.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        debug!(path = %settings.path, "opening sqlite database");
        let inner = rusqlite::Connection::open_with_flags(&settings.path, flags)?;
        Ok(Self::from_connection(inner))
    }

    pub fn open_in_memory() -> Result<Self, DataAccessError> {
        Ok(Self::from_connection(rusqlite::Connection::open_in_memory()?))
    }

    #[must_use]
    pub const fn from_connection(inner: rusqlite::Connection) -> Self {
        Self {
            inner,
            evaluator: SqlStatementEvaluator::sqlite(),
        }
    }

    /// Runs raw SQL (schema setup, fixtures). Not routed through a Statement.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        self.inner.execute_batch(sql)?;
        Ok(())
    }

    #[must_use]
    pub const fn inner(&self) -> &rusqlite::Connection {
        &self.inner
    }
}

impl Connection for SqliteConnection {
    type Prepared<'c> = SqlitePrepared<'c>;

    fn evaluator(&self) -> &dyn StatementEvaluator {
        &self.evaluator
    }

    fn prepare(&self, statement: &Statement) -> Result<SqlitePrepared<'_>, DataAccessError> {
        let compiled = self.evaluator.compile(statement)?;
        debug!(sql = %compiled.sql, literals = compiled.params.len(), "preparing statement");

        match self.inner.prepare(&compiled.sql) {
            Ok(prepared) => Ok(SqlitePrepared {
                statement: prepared,
                compiled,
            }),
            Err(e) => Err(self.catch_error(statement, &e)),
        }
    }

    fn last_insert_id(&self) -> i64 {
        self.inner.last_insert_rowid()
    }
}

pub struct SqlitePrepared<'c> {
    statement: rusqlite::Statement<'c>,
    compiled: CompiledStatement,
}

impl SqlitePrepared<'_> {
    /// Execution error carrying the SQL and every bound value.
    fn failure(
        compiled: &CompiledStatement,
        binds: &Binds,
        error: &rusqlite::Error,
    ) -> DataAccessError {
        let mut all = Binds::from(compiled.params.clone());
        all.extend(binds.iter().cloned());
        DataAccessError::Execution {
            sql: compiled.sql.clone(),
            binds: all.to_string(),
            message: error.to_string(),
        }
    }
}

impl PreparedStatement for SqlitePrepared<'_> {
    fn sql(&self) -> &str {
        &self.compiled.sql
    }

    fn execute(&mut self, binds: &Binds) -> Result<usize, DataAccessError> {
        let compiled = &self.compiled;
        let named: Vec<(&str, &dyn ToSql)> = compiled
            .params
            .iter()
            .chain(binds.iter())
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();

        let affected = self
            .statement
            .execute(named.as_slice())
            .map_err(|e| Self::failure(compiled, binds, &e))?;
        debug!(sql = %compiled.sql, affected, "statement executed");
        Ok(affected)
    }

    fn fetch_all(&mut self, binds: &Binds) -> Result<Vec<Record>, DataAccessError> {
        let compiled = &self.compiled;
        let named: Vec<(&str, &dyn ToSql)> = compiled
            .params
            .iter()
            .chain(binds.iter())
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let columns: Vec<String> = self
            .statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = self
            .statement
            .query(named.as_slice())
            .map_err(|e| Self::failure(compiled, binds, &e))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(|e| Self::failure(compiled, binds, &e))? {
            let mut record = Record::new();
            for (index, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(index)
                    .map_err(|e| Self::failure(compiled, binds, &e))?;
                record.insert(column.clone(), Value::from(value));
            }
            records.push(record);
        }
        debug!(sql = %compiled.sql, rows = records.len(), "statement fetched");
        Ok(records)
    }
}
