// SQLite databases opened from settings, persisted across connections
use tablegate::{
    Condition, Connection, DataAccessError, DatabaseSettings, Dialect, Filter, Model, Record,
    SqliteConnection, Statement, TableDataGateway, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: Option<i64>,
    body: String,
    pinned: bool,
}

impl Model for Note {
    const TABLE: &'static str = "notes";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("body", self.body.as_str())
            .with("pinned", self.pinned)
    }

    fn from_record(record: &Record) -> Result<Self, DataAccessError> {
        Ok(Self {
            id: record.require("id")?,
            body: record.require("body")?,
            pinned: record.require("pinned")?,
        })
    }
}

fn settings(path: &std::path::Path, create_if_missing: bool) -> DatabaseSettings {
    DatabaseSettings {
        path: path.to_string_lossy().into_owned(),
        dialect: Dialect::Sqlite,
        create_if_missing,
    }
}

#[test]
fn test_rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    {
        let conn = SqliteConnection::open(&settings(&path, true)).unwrap();
        conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, pinned INTEGER)")
            .unwrap();
        let gateway: TableDataGateway<'_, Note, _> = TableDataGateway::new(&conn);
        gateway
            .create(&Note { id: None, body: "it's here".to_string(), pinned: true })
            .unwrap();
    }

    let conn = SqliteConnection::open(&settings(&path, false)).unwrap();
    let mut gateway: TableDataGateway<'_, Note, _> = TableDataGateway::new(&conn);
    let notes = gateway.find_all(&[Filter::eq("pinned", true)], &[]).unwrap();

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "it's here");
    assert!(notes[0].pinned);
}

#[test]
fn test_missing_file_without_create_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteConnection::open(&settings(&dir.path().join("absent.db"), false));
    assert!(matches!(result, Err(DataAccessError::Connection(_))));
}

#[test]
fn test_memory_path_opens_private_database() {
    let memory = DatabaseSettings::default();
    let conn = SqliteConnection::open(&memory).unwrap();
    conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2), (3);")
        .unwrap();

    let mut statement = Statement::new();
    statement.select_as("COUNT(*)", "total").unwrap().from("t").unwrap();
    statement.where_(Condition::new("x", ">=", 2));

    let rows = conn.query(&statement).unwrap();
    assert_eq!(rows[0].get("total"), Some(&Value::Integer(2)));
}
