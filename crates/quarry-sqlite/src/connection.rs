//! One owned backend handle with reference-counted transaction nesting.

use std::cell::Cell;

use rusqlite::types::{Value as NativeValue, ValueRef};
use tracing::debug;

use quarry_core::{Row, SqlValue};

use crate::config::{ConnectionSettings, Driver};
use crate::error::{DbError, Result};

/// A live database connection.
///
/// Owns exactly one `rusqlite` handle. All statement execution for one
/// configured backend funnels through here; the handle is not `Sync`, so a
/// connection never crosses threads; callers needing concurrency open one
/// connection per thread.
pub struct Connection {
    conn: rusqlite::Connection,
    database: String,
    depth: Cell<u32>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("database", &self.database)
            .field("transaction_depth", &self.depth.get())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Opens the backend described by `settings`.
    ///
    /// An unknown driver id is a configuration error; a backend that cannot
    /// be opened is a fatal connection error.
    pub fn open(settings: &ConnectionSettings) -> Result<Self> {
        let Driver::Sqlite = Driver::parse(&settings.driver)?;

        let open_result = if settings.database.is_empty() || settings.database == ":memory:" {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&settings.database)
        };
        let conn = open_result.map_err(|source| DbError::Connection {
            database: settings.database.clone(),
            source,
        })?;

        // SQLite does not enforce foreign keys unless asked.
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|source| DbError::Connection {
                database: settings.database.clone(),
                source,
            })?;

        Ok(Self {
            conn,
            database: settings.database.clone(),
            depth: Cell::new(0),
        })
    }

    /// The configured database path.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Runs a statement and returns every row.
    pub fn select(&self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        debug!(sql, bindings = bindings.len(), "select");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        let mut native = stmt.query(rusqlite::params_from_iter(bindings.iter().map(to_native)))?;
        let mut rows = Vec::new();
        while let Some(fetched) = native.next()? {
            let mut row = Row::new();
            for (i, column) in columns.iter().enumerate() {
                row.set(column.clone(), from_native(fetched.get_ref(i)?));
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Runs a statement and returns the first row, if any.
    pub fn select_one(&self, sql: &str, bindings: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.select(sql, bindings)?.into_iter().next())
    }

    /// Runs a statement and returns the affected-row count.
    pub fn execute(&self, sql: &str, bindings: &[SqlValue]) -> Result<usize> {
        debug!(sql, bindings = bindings.len(), "execute");
        let affected = self
            .conn
            .execute(sql, rusqlite::params_from_iter(bindings.iter().map(to_native)))?;
        Ok(affected)
    }

    /// Runs an INSERT and returns the generated row id.
    pub fn insert(&self, sql: &str, bindings: &[SqlValue]) -> Result<i64> {
        self.execute(sql, bindings)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The row id generated by the most recent INSERT on this connection.
    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Runs a multi-statement script without bindings.
    pub fn execute_script(&self, sql: &str) -> Result<()> {
        debug!(sql, "execute script");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Current transaction nesting depth. Zero means autocommit.
    #[must_use]
    pub fn transaction_depth(&self) -> u32 {
        self.depth.get()
    }

    /// Begins a transaction, or joins the enclosing one.
    ///
    /// Only the outermost call issues a physical BEGIN; nested calls just
    /// increment the depth counter, so helper functions can each wrap their
    /// own transaction without breaking a caller's.
    pub fn begin_transaction(&self) -> Result<()> {
        if self.depth.get() == 0 {
            self.conn.execute_batch("BEGIN")?;
        }
        self.depth.set(self.depth.get() + 1);
        Ok(())
    }

    /// Commits the current nesting level.
    ///
    /// Physical COMMIT happens only when the outermost level commits;
    /// inner levels just decrement the depth counter.
    pub fn commit(&self) -> Result<()> {
        if self.depth.get() == 1 {
            self.conn.execute_batch("COMMIT")?;
        }
        self.depth.set(self.depth.get().saturating_sub(1));
        Ok(())
    }

    /// Rolls back the current nesting level.
    ///
    /// Physical ROLLBACK happens only at the outermost level; inner levels
    /// just decrement the depth counter. A failed statement never rolls
    /// back on its own; that is the caller's decision.
    pub fn rollback(&self) -> Result<()> {
        if self.depth.get() == 1 {
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.depth.set(self.depth.get().saturating_sub(1));
        Ok(())
    }

    /// Runs `work` inside a transaction level: commit on `Ok`, rollback and
    /// propagate on `Err`.
    pub fn transaction<T, E>(
        &self,
        work: impl FnOnce(&Self) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<DbError>,
    {
        self.begin_transaction().map_err(E::from)?;
        match work(self) {
            Ok(value) => {
                self.commit().map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                self.rollback().map_err(E::from)?;
                Err(err)
            }
        }
    }
}

fn to_native(value: &SqlValue) -> NativeValue {
    match value {
        SqlValue::Null => NativeValue::Null,
        SqlValue::Bool(b) => NativeValue::Integer(i64::from(*b)),
        SqlValue::Int(n) => NativeValue::Integer(*n),
        SqlValue::Float(f) => NativeValue::Real(*f),
        SqlValue::Text(s) => NativeValue::Text(s.clone()),
        SqlValue::Blob(b) => NativeValue::Blob(b.clone()),
    }
}

fn from_native(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(n) => SqlValue::Int(n),
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::ToSqlValue;

    fn memory() -> Connection {
        Connection::open(&ConnectionSettings::sqlite(":memory:")).unwrap()
    }

    fn seeded() -> Connection {
        let conn = memory();
        conn.execute_script(
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
        )
        .unwrap();
        conn
    }

    #[test]
    fn unsupported_driver_fails_before_opening() {
        let mut settings = ConnectionSettings::sqlite(":memory:");
        settings.driver = String::from("mysql");
        assert!(matches!(
            Connection::open(&settings),
            Err(DbError::UnsupportedDriver(_))
        ));
    }

    #[test]
    fn unopenable_database_is_a_connection_error() {
        let settings = ConnectionSettings::sqlite("/nonexistent-dir/some.db");
        assert!(matches!(
            Connection::open(&settings),
            Err(DbError::Connection { .. })
        ));
    }

    #[test]
    fn insert_returns_generated_id() {
        let conn = seeded();
        let id = conn
            .insert(
                "INSERT INTO users (name) VALUES (?)",
                &["alice".to_sql_value()],
            )
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(conn.last_insert_id(), 1);

        let row = conn
            .select_one("SELECT id, name FROM users WHERE id = ?", &[id.to_sql_value()])
            .unwrap()
            .unwrap();
        assert_eq!(row.get_str("name"), Some("alice"));
    }

    #[test]
    fn malformed_statement_propagates_as_query_error() {
        let conn = memory();
        assert!(matches!(
            conn.execute("NOT A STATEMENT", &[]),
            Err(DbError::Query(_))
        ));
    }

    #[test]
    fn nested_commit_is_physical_only_at_depth_zero() {
        let conn = seeded();

        conn.begin_transaction().unwrap();
        conn.begin_transaction().unwrap();
        assert_eq!(conn.transaction_depth(), 2);

        conn.execute(
            "INSERT INTO users (name) VALUES (?)",
            &["nested".to_sql_value()],
        )
        .unwrap();

        // Inner commit only drops the counter; the transaction stays open.
        conn.commit().unwrap();
        assert_eq!(conn.transaction_depth(), 1);
        conn.commit().unwrap();
        assert_eq!(conn.transaction_depth(), 0);

        let rows = conn.select("SELECT * FROM users", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn inner_rollback_only_decrements_depth() {
        let conn = seeded();

        conn.begin_transaction().unwrap();
        conn.begin_transaction().unwrap();
        conn.execute(
            "INSERT INTO users (name) VALUES (?)",
            &["doomed".to_sql_value()],
        )
        .unwrap();

        // Depth 2: no physical rollback yet, the write is still visible
        // inside the open transaction.
        conn.rollback().unwrap();
        assert_eq!(conn.transaction_depth(), 1);
        let inside = conn.select("SELECT * FROM users", &[]).unwrap();
        assert_eq!(inside.len(), 1);

        // Depth 1: this one is physical.
        conn.rollback().unwrap();
        assert_eq!(conn.transaction_depth(), 0);
        let after = conn.select("SELECT * FROM users", &[]).unwrap();
        assert!(after.is_empty());
    }

    #[test]
    fn transaction_helper_commits_on_ok_and_rolls_back_on_err() {
        let conn = seeded();

        conn.transaction::<_, DbError>(|c| {
            c.execute("INSERT INTO users (name) VALUES (?)", &["kept".to_sql_value()])?;
            Ok(())
        })
        .unwrap();

        let failed: Result<()> = conn.transaction(|c| {
            c.execute("INSERT INTO users (name) VALUES (?)", &["lost".to_sql_value()])?;
            c.execute("NOT A STATEMENT", &[])?;
            Ok(())
        });
        assert!(failed.is_err());
        assert_eq!(conn.transaction_depth(), 0);

        let rows = conn.select("SELECT name FROM users", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name"), Some("kept"));
    }
}
