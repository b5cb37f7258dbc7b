//! # quarry-migrate
//!
//! Schema evolution for the quarry data-access engine:
//!
//! - [`SchemaBuilder`] / [`Blueprint`] / [`ColumnDefinition`] /
//!   [`ForeignKeyDefinition`]: accumulate table descriptions and emit DDL
//! - [`Migration`] / [`MigrationRegistry`] / [`MigrationRunner`]: versioned,
//!   batch-scoped, reversible schema migration
//!
//! Migrations are plain types implementing [`Migration`], registered once at
//! startup under the TitleCase identifier derived from their file name. The
//! runner tracks applied migrations in a `migrations` metadata table,
//! applies pending ones in file-name order under one shared batch number,
//! and rolls back exactly the most recent batch in reverse order.
//!
//! # Example
//!
//! ```ignore
//! struct CreateUsersTable;
//!
//! impl Migration for CreateUsersTable {
//!     fn up(&self, schema: &SchemaBuilder) -> Result<()> {
//!         schema.create("users", |table| {
//!             table.id();
//!             table.string("name");
//!             table.string("email").unique();
//!             table.timestamps();
//!             table.soft_deletes();
//!         })
//!     }
//!
//!     fn down(&self, schema: &SchemaBuilder) -> Result<()> {
//!         schema.drop("users")
//!     }
//! }
//!
//! let mut registry = MigrationRegistry::new();
//! registry.register("CreateUsersTable", || Box::new(CreateUsersTable));
//!
//! let runner = MigrationRunner::new(&db, registry);
//! runner.run(&files)?;   // files from the discovery collaborator
//! runner.rollback()?;    // reverts the batch just applied
//! ```

mod error;
mod runner;
pub mod schema;

pub use error::{MigrateError, Result};
pub use runner::{
    migration_ident, Migration, MigrationRecord, MigrationRegistry, MigrationRunner,
    MIGRATIONS_TABLE,
};
pub use schema::{
    add_column_sql, create_table_sql, Blueprint, ColumnDefinition, ColumnType, DefaultValue,
    ForeignKeyDefinition, SchemaBuilder,
};
