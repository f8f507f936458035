// Gateway behaviour against SQLite, with every executed statement recorded
use std::cell::RefCell;

use tablegate::connection::SqlitePrepared;
use tablegate::{
    Binds, Condition, Connection, DataAccessError, Filter, Model, Ordering, PreparedStatement,
    Record, SqliteConnection, Statement, StatementEvaluator, TableDataGateway, Tracked, Value,
};

type Log = RefCell<Vec<(String, Binds)>>;

/// Delegates to SQLite and logs the SQL and binds of each execution.
struct RecordingConnection {
    inner: SqliteConnection,
    log: Log,
}

struct RecordingPrepared<'c> {
    inner: SqlitePrepared<'c>,
    log: &'c Log,
}

impl RecordingConnection {
    fn new() -> Self {
        let inner = SqliteConnection::open_in_memory().unwrap();
        inner
            .execute_batch(
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT,
                    age INTEGER NOT NULL
                );",
            )
            .unwrap();
        Self {
            inner,
            log: RefCell::new(Vec::new()),
        }
    }

    fn executed(&self) -> Vec<(String, Binds)> {
        self.log.borrow().clone()
    }

    fn last(&self) -> (String, Binds) {
        self.log.borrow().last().cloned().expect("nothing executed")
    }

    fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl PreparedStatement for RecordingPrepared<'_> {
    fn sql(&self) -> &str {
        self.inner.sql()
    }

    fn execute(&mut self, binds: &Binds) -> Result<usize, DataAccessError> {
        self.log.borrow_mut().push((self.inner.sql().to_string(), binds.clone()));
        self.inner.execute(binds)
    }

    fn fetch_all(&mut self, binds: &Binds) -> Result<Vec<Record>, DataAccessError> {
        self.log.borrow_mut().push((self.inner.sql().to_string(), binds.clone()));
        self.inner.fetch_all(binds)
    }
}

impl Connection for RecordingConnection {
    type Prepared<'c> = RecordingPrepared<'c>;

    fn evaluator(&self) -> &dyn StatementEvaluator {
        self.inner.evaluator()
    }

    fn prepare(&self, statement: &Statement) -> Result<RecordingPrepared<'_>, DataAccessError> {
        Ok(RecordingPrepared {
            inner: self.inner.prepare(statement)?,
            log: &self.log,
        })
    }

    fn last_insert_id(&self) -> i64 {
        self.inner.last_insert_id()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: Option<i64>,
    name: String,
    email: Option<String>,
    age: i64,
}

impl User {
    fn new(name: &str, email: Option<&str>, age: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: email.map(ToString::to_string),
            age,
        }
    }
}

impl Model for User {
    const TABLE: &'static str = "users";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("email", self.email.clone())
            .with("age", self.age)
    }

    fn from_record(record: &Record) -> Result<Self, DataAccessError> {
        Ok(Self {
            id: record.require("id")?,
            name: record.require("name")?,
            email: record.require("email")?,
            age: record.require("age")?,
        })
    }
}

fn seeded() -> RecordingConnection {
    let conn = RecordingConnection::new();
    {
        let gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);
        gateway.create(&User::new("Ann", Some("ann@example.org"), 31)).unwrap();
        gateway.create(&User::new("Bob", None, 25)).unwrap();
        gateway.create(&User::new("Cid", Some("cid@example.org"), 47)).unwrap();
    }
    conn.clear();
    conn
}

#[test]
fn test_find_all_without_filters_selects_everything() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let users = gateway.find_all(&[], &[]).unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(conn.last(), ("SELECT * FROM users".to_string(), Binds::new()));
    assert_eq!(gateway.snapshot_count(), 3);
}

#[test]
fn test_find_all_binds_filters_and_orders() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let users = gateway
        .find_all(
            &[Filter::new("age", ">", 30), Filter::new("age", "<", 50)],
            &[Ordering::desc("age"), Ordering::asc("name")],
        )
        .unwrap();

    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Cid", "Ann"]);

    let (sql, binds) = conn.last();
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE age > :age AND age < :age_2 ORDER BY age DESC, name ASC"
    );
    assert_eq!(binds.get(":age"), Some(&Value::Integer(30)));
    assert_eq!(binds.get(":age_2"), Some(&Value::Integer(50)));
}

#[test]
fn test_find_one_returns_first_match_or_none() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let bob = gateway.find_one(&[Filter::eq("name", "Bob")], &[]).unwrap().unwrap();
    assert_eq!(bob.email, None);
    assert_eq!(bob.age, 25);

    let nobody = gateway.find_one(&[Filter::eq("name", "Zed")], &[]).unwrap();
    assert!(nobody.is_none());
    assert_eq!(gateway.snapshot_count(), 1);
}

#[test]
fn test_create_inserts_model_fields_and_returns_id() {
    let conn = seeded();
    let gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let id = gateway.create(&User::new("Dee", None, 19)).unwrap();
    assert_eq!(id, 4);

    let (sql, binds) = conn.last();
    assert_eq!(
        sql,
        "INSERT INTO users (id,name,email,age) VALUES (:id,:name,:email,:age)"
    );
    assert_eq!(binds.get(":name"), Some(&Value::from("Dee")));
    assert_eq!(binds.get(":id"), Some(&Value::Null));
}

#[test]
fn test_update_targets_snapshot_values() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut ann = gateway.find_one(&[Filter::eq("name", "Ann")], &[]).unwrap().unwrap();
    ann.name = "Anna".to_string();
    ann.age = 32;
    assert!(gateway.update(&ann).unwrap());

    let (sql, binds) = conn.last();
    assert_eq!(
        sql,
        "UPDATE users SET id = :n_id, name = :n_name, email = :n_email, age = :n_age \
         WHERE id = :o_id AND name = :o_name AND email = :o_email AND age = :o_age"
    );
    assert_eq!(binds.get(":n_name"), Some(&Value::from("Anna")));
    assert_eq!(binds.get(":o_name"), Some(&Value::from("Ann")));
    assert_eq!(binds.get(":n_age"), Some(&Value::Integer(32)));
    assert_eq!(binds.get(":o_age"), Some(&Value::Integer(31)));

    let stored = gateway.find_one(&[Filter::eq("id", 1)], &[]).unwrap().unwrap();
    assert_eq!(stored.name, "Anna");
    assert_eq!(stored.age, 32);
}

#[test]
fn test_repeated_update_keeps_original_snapshot() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut cid = gateway.find_one(&[Filter::eq("name", "Cid")], &[]).unwrap().unwrap();
    cid.age = 48;
    assert!(gateway.update(&cid).unwrap());
    let (_, first) = conn.last();

    cid.age = 49;
    assert!(gateway.update(&cid).unwrap());
    let (_, second) = conn.last();

    assert_eq!(first.get(":o_age"), Some(&Value::Integer(47)));
    assert_eq!(second.get(":o_age"), Some(&Value::Integer(47)));

    // The row now holds 48, so the second update matched nothing
    let stored = gateway.find_one(&[Filter::eq("name", "Cid")], &[]).unwrap().unwrap();
    assert_eq!(stored.age, 48);
}

#[test]
fn test_update_of_unknown_object_executes_nothing() {
    let conn = seeded();
    let gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let stranger = Tracked::detached(User::new("Ann", None, 1));
    assert!(!gateway.update(&stranger).unwrap());
    assert!(conn.executed().is_empty());
}

#[test]
fn test_snapshot_of_other_gateway_is_not_shared() {
    let conn = seeded();
    let mut reader: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);
    let writer: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let bob = reader.find_one(&[Filter::eq("name", "Bob")], &[]).unwrap().unwrap();
    conn.clear();

    assert!(!writer.update(&bob).unwrap());
    assert!(conn.executed().is_empty());
}

#[test]
fn test_update_with_null_snapshot_field() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut bob = gateway.find_one(&[Filter::eq("name", "Bob")], &[]).unwrap().unwrap();
    bob.email = Some("bob@example.org".to_string());
    assert!(gateway.update(&bob).unwrap());

    let (sql, _) = conn.last();
    assert!(
        sql.ends_with("WHERE id = :o_id AND name = :o_name AND email IS NULL AND age = :o_age")
    );

    let stored = gateway.find_one(&[Filter::eq("id", 2)], &[]).unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("bob@example.org"));
}

#[test]
fn test_delete_matches_current_values() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let ann = gateway.find_one(&[Filter::eq("name", "Ann")], &[]).unwrap().unwrap();
    assert_eq!(gateway.delete(&ann).unwrap(), 1);

    let (sql, binds) = conn.last();
    assert_eq!(
        sql,
        "DELETE FROM users \
         WHERE id = :o_id AND name = :o_name AND email = :o_email AND age = :o_age"
    );
    assert_eq!(binds.len(), 4);

    // Stale values match no row
    let mut stale = ann.into_inner();
    stale.age = 99;
    assert_eq!(gateway.delete(&stale).unwrap(), 0);
    assert_eq!(gateway.find_all(&[], &[]).unwrap().len(), 2);
}

#[test]
fn test_find_custom_does_not_snapshot() {
    let conn = seeded();
    let mut gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut statement = Statement::new();
    statement.from("users").unwrap();
    statement
        .where_(Condition::new("age", "<", 40))
        .order_by("name");
    statement.limit(0, 1).unwrap();

    let users = gateway.find_custom(&statement).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ann");
    assert_eq!(gateway.snapshot_count(), 0);

    let (sql, binds) = conn.last();
    assert_eq!(sql, "SELECT * FROM users WHERE age < :_1 ORDER BY name ASC LIMIT 0,1");
    assert!(binds.is_empty());

    assert!(!gateway.update(&Tracked::detached(users[0].clone())).unwrap());
    let _ = gateway.find_all(&[], &[]).unwrap();
    assert_eq!(gateway.snapshot_count(), 3);
}

#[test]
fn test_prepare_failure_is_wrapped_with_operation() {
    let conn = seeded();
    let gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut statement = Statement::new();
    statement.from("no_such_table").unwrap();
    let err = gateway.find_custom(&statement).unwrap_err();

    assert!(err.to_string().starts_with("TableDataGateway.find_custom: "));
    assert!(err.to_string().contains("during SELECT * FROM no_such_table"));
}

#[test]
fn test_execution_failure_carries_sql_and_binds() {
    let conn = seeded();
    let gateway: TableDataGateway<'_, User, _> = TableDataGateway::new(&conn);

    let mut duplicate = User::new("Eve", None, 22);
    duplicate.id = Some(1);

    match gateway.create(&duplicate).unwrap_err() {
        DataAccessError::Gateway { operation, source } => {
            assert_eq!(operation, "create");
            match *source {
                DataAccessError::Execution { sql, binds, message } => {
                    assert_eq!(
                        sql,
                        "INSERT INTO users (id,name,email,age) VALUES (:id,:name,:email,:age)"
                    );
                    assert_eq!(binds, ":id=1, :name='Eve', :email=NULL, :age=22");
                    assert!(message.contains("UNIQUE"));
                }
                other => panic!("unexpected cause: {other}"),
            }
        }
        other => panic!("unexpected error: {other}"),
    }
}
