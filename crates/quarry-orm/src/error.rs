//! Error types for the entity layer.

use thiserror::Error;

/// Errors raised by model persistence and finders.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database error from the connection layer.
    #[error("database error: {0}")]
    Database(#[from] quarry_sqlite::DbError),

    /// A find-or-fail lookup matched nothing.
    #[error("no {model} record found")]
    NotFound {
        /// The model's table name.
        model: &'static str,
    },

    /// A by-primary-key operation ran on a record with no key value.
    #[error("{model} record has no primary key value; cannot {operation}")]
    MissingPrimaryKey {
        /// The model's table name.
        model: &'static str,
        /// The operation that needed the key.
        operation: &'static str,
    },

    /// `restore()` on a model without a soft-delete column.
    #[error("{model} does not use soft deletes")]
    SoftDeletesDisabled {
        /// The model's table name.
        model: &'static str,
    },
}

/// Result type alias for entity operations.
pub type Result<T> = std::result::Result<T, OrmError>;
