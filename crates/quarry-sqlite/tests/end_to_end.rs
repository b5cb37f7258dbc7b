//! Configuration-to-query flow against a file-backed database.

use quarry_core::{Row, SqlValue, ToSqlValue};
use quarry_sqlite::{ConnectionManager, DbError};

fn manager_for(path: &str) -> ConnectionManager {
    let config = config::Config::builder()
        .set_override("database.default", "app")
        .unwrap()
        .set_override("database.connections.app.driver", "sqlite")
        .unwrap()
        .set_override("database.connections.app.database", path)
        .unwrap()
        .set_override("database.connections.bad.driver", "pgsql")
        .unwrap()
        .set_override("database.connections.bad.database", "app")
        .unwrap()
        .build()
        .unwrap();
    ConnectionManager::new(config)
}

#[test]
fn writes_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.sqlite");
    let path = path.to_str().unwrap();

    {
        let db = manager_for(path);
        let conn = db.connection().unwrap();
        conn.execute_script(
            "CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .unwrap();
        db.table("settings")
            .unwrap()
            .insert(Row::from_iter([("key", "theme"), ("value", "dark")]))
            .unwrap();
    }

    // A second manager over the same file sees the committed data.
    let db = manager_for(path);
    let row = db
        .table("settings")
        .unwrap()
        .where_eq("key", "theme")
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(row.get_str("value"), Some("dark"));
}

#[test]
fn unsupported_driver_surfaces_at_connect_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.sqlite");
    let db = manager_for(path.to_str().unwrap());

    assert!(matches!(
        db.connection_named("bad"),
        Err(DbError::UnsupportedDriver(_))
    ));
}

#[test]
fn constraint_violation_propagates_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.sqlite");
    let db = manager_for(path.to_str().unwrap());

    let conn = db.connection().unwrap();
    conn.execute_script("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT UNIQUE)")
        .unwrap();

    let insert = |email: &str| {
        db.table("users")
            .unwrap()
            .insert(Row::from_iter([("email", email)]))
    };
    insert("a@x.com").unwrap();
    assert!(matches!(insert("a@x.com"), Err(DbError::Query(_))));

    // No retry happened: exactly one row made it in.
    let mut q = db.table("users").unwrap();
    assert_eq!(q.count().unwrap(), 1);
}

#[test]
fn caller_controls_rollback_after_a_failed_statement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.sqlite");
    let db = manager_for(path.to_str().unwrap());

    let conn = db.connection().unwrap();
    conn.execute_script("CREATE TABLE counters (n INTEGER NOT NULL)")
        .unwrap();

    conn.begin_transaction().unwrap();
    conn.execute("INSERT INTO counters (n) VALUES (?)", &[1.to_sql_value()])
        .unwrap();
    // A failed statement leaves the transaction open at the same depth.
    assert!(conn.execute("BROKEN", &[]).is_err());
    assert_eq!(conn.transaction_depth(), 1);
    conn.rollback().unwrap();

    let rows = conn.select("SELECT * FROM counters", &[]).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn builder_blob_and_null_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.sqlite");
    let db = manager_for(path.to_str().unwrap());

    db.connection()
        .unwrap()
        .execute_script("CREATE TABLE files (id INTEGER PRIMARY KEY, body BLOB, note TEXT)")
        .unwrap();

    db.table("files")
        .unwrap()
        .insert(Row::from_iter([
            ("body", SqlValue::Blob(vec![1, 2, 3])),
            ("note", SqlValue::Null),
        ]))
        .unwrap();

    let row = db.table("files").unwrap().first().unwrap().unwrap();
    assert_eq!(row.get("body"), Some(&SqlValue::Blob(vec![1, 2, 3])));
    assert_eq!(row.get("note"), Some(&SqlValue::Null));
}
