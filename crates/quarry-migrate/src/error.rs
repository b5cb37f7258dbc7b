//! Error types for the schema and migration system.

use thiserror::Error;

/// Errors raised while building schemas or running migrations.
///
/// An error from a migration's `up`/`down` step aborts the remainder of
/// that run or rollback immediately; steps already completed in the same
/// invocation stay applied; there is no automatic revert.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Database error from the connection layer.
    #[error("database error: {0}")]
    Database(#[from] quarry_sqlite::DbError),

    /// A discovered migration file has no registered definition.
    #[error("no migration registered as '{ident}' for file '{file}'")]
    UnknownMigration {
        /// The discovered file name.
        file: String,
        /// The identifier it resolved to.
        ident: String,
    },

    /// A foreign key was declared without its referenced table or column.
    #[error("incomplete foreign key on {table}.{column}: missing references()/on()")]
    IncompleteForeignKey {
        /// The table being created.
        table: String,
        /// The owning column.
        column: String,
    },
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
