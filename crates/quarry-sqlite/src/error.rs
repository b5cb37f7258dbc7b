//! Error types for the connection layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by connections, the manager and the query builder.
#[derive(Debug, Error)]
pub enum DbError {
    /// No entry under `database.connections.<name>`.
    #[error("unknown database connection '{0}'")]
    UnknownConnection(String),

    /// The configured driver has no backend in this build.
    #[error("unsupported database driver '{0}'")]
    UnsupportedDriver(String),

    /// The configuration source itself could not be read or deserialized.
    #[error("invalid database configuration: {0}")]
    Configuration(#[from] config::ConfigError),

    /// The backend could not be opened. Fatal.
    #[error("failed to open database '{database}': {source}")]
    Connection {
        /// The configured database path.
        database: String,
        /// The underlying driver error.
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed. Propagated unchanged to the caller, never
    /// retried.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A batch insert row does not match the column list of the first row.
    #[error("insert row {row} does not provide column '{column}'")]
    ColumnMismatch {
        /// Zero-based row index.
        row: usize,
        /// The missing or unexpected column.
        column: String,
    },

    /// A named SQL file does not exist.
    #[error("sql file not found: {0}")]
    SqlFileNotFound(PathBuf),

    /// A named SQL file exists but is empty.
    #[error("sql file is empty: {0}")]
    SqlFileEmpty(PathBuf),

    /// Filesystem error while loading SQL files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for connection-layer operations.
pub type Result<T> = std::result::Result<T, DbError>;
