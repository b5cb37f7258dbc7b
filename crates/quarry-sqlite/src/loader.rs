//! Named SQL file execution.

use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use quarry_core::{Row, SqlValue};

use crate::connection::Connection;
use crate::error::{DbError, Result};

/// Loads `.sql` files from a directory and runs them on a connection.
///
/// Useful for hand-tuned statements too awkward for the query builder;
/// files are addressed by name, with the `.sql` extension optional.
pub struct SqlLoader {
    connection: Rc<Connection>,
    directory: PathBuf,
}

impl SqlLoader {
    /// Creates a loader rooted at `directory`.
    #[must_use]
    pub fn new(connection: Rc<Connection>, directory: impl Into<PathBuf>) -> Self {
        Self {
            connection,
            directory: directory.into(),
        }
    }

    /// Reads and trims a named SQL file.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        if !path.exists() {
            return Err(DbError::SqlFileNotFound(path));
        }
        let sql = std::fs::read_to_string(&path)?;
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(DbError::SqlFileEmpty(path));
        }
        debug!(file = %path.display(), "loaded sql file");
        Ok(String::from(sql))
    }

    /// Runs a named file as a statement, returning the affected count.
    pub fn execute(&self, name: &str, bindings: &[SqlValue]) -> Result<usize> {
        let sql = self.load(name)?;
        self.connection.execute(&sql, bindings)
    }

    /// Runs a named file as a query, returning its rows.
    pub fn query(&self, name: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        let sql = self.load(name)?;
        self.connection.select(&sql, bindings)
    }

    /// True when the named file exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }

    /// All `.sql` file names in the directory, sorted.
    pub fn all(&self) -> Result<Vec<String>> {
        if !self.directory.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "sql") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(String::from(name));
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let name = name.trim_start_matches('/');
        let mut path = self.directory.join(name);
        if path.extension().is_none() {
            path.set_extension("sql");
        }
        path
    }
}

impl std::fmt::Debug for SqlLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlLoader")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
