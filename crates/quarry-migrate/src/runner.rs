//! Versioned migration execution with batch-scoped rollback.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{info, warn};

use quarry_core::{Row, ToSqlValue, DATETIME_FORMAT};
use quarry_sqlite::ConnectionManager;

use crate::error::{MigrateError, Result};
use crate::schema::SchemaBuilder;

/// The metadata table tracking applied migrations.
pub const MIGRATIONS_TABLE: &str = "migrations";

/// One reversible schema change.
///
/// Implementations describe their change against a [`SchemaBuilder`]; the
/// runner decides when each side executes.
pub trait Migration {
    /// Applies the change.
    fn up(&self, schema: &SchemaBuilder) -> Result<()>;

    /// Reverts the change.
    fn down(&self, schema: &SchemaBuilder) -> Result<()>;
}

/// Explicit registration table mapping identifiers to migration factories.
///
/// Discovery hands the runner file names; this registry owns the matching
/// in-memory definitions, registered once at startup. Nothing is resolved
/// reflectively.
#[derive(Default)]
pub struct MigrationRegistry {
    factories: HashMap<String, Box<dyn Fn() -> Box<dyn Migration>>>,
}

impl std::fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("registered", &self.factories.len())
            .finish_non_exhaustive()
    }
}

impl MigrationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a migration under its TitleCase identifier.
    pub fn register<F>(&mut self, ident: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Migration> + 'static,
    {
        self.factories.insert(ident.into(), Box::new(factory));
        self
    }

    /// Instantiates the migration registered under `ident`.
    #[must_use]
    pub fn resolve(&self, ident: &str) -> Option<Box<dyn Migration>> {
        self.factories.get(ident).map(|factory| factory())
    }

    /// True when `ident` has a registered definition.
    #[must_use]
    pub fn contains(&self, ident: &str) -> bool {
        self.factories.contains_key(ident)
    }
}

/// A persisted migration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// The migration file name.
    pub migration: String,
    /// The batch it was applied in.
    pub batch: i64,
}

/// Applies pending migrations and rolls back the most recent batch.
///
/// Metadata lives in the [`MIGRATIONS_TABLE`]; every migration applied by
/// one `run` shares a batch number one higher than any batch before it.
/// A failing `up`/`down` step aborts the remaining steps of that
/// invocation; completed steps are not reverted automatically. The
/// check-then-record sequence is not atomic with the schema change itself;
/// concurrent runners are not defended against here.
pub struct MigrationRunner<'a> {
    manager: &'a ConnectionManager,
    registry: MigrationRegistry,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a runner over the manager's current connection.
    #[must_use]
    pub fn new(manager: &'a ConnectionManager, registry: MigrationRegistry) -> Self {
        Self { manager, registry }
    }

    /// Applies every pending migration from `files`, in ascending name
    /// order, under one shared batch number. Returns the applied names.
    ///
    /// `files` comes from the discovery collaborator: migration file names
    /// with their sortable timestamp prefix, e.g.
    /// `2024_01_01_000000_create_users_table`.
    pub fn run(&self, files: &[String]) -> Result<Vec<String>> {
        self.ensure_migrations_table()?;

        let applied = self.applied_set()?;
        let mut pending: Vec<&String> = files.iter().filter(|f| !applied.contains(*f)).collect();
        pending.sort();

        if pending.is_empty() {
            info!("nothing to migrate");
            return Ok(Vec::new());
        }

        let batch = self.last_batch()?.unwrap_or(0) + 1;
        let schema = SchemaBuilder::new(self.manager.connection()?);

        let mut done = Vec::with_capacity(pending.len());
        for file in pending {
            let migration = self.resolve(file)?;
            info!(migration = %file, batch, "applying migration");
            migration.up(&schema)?;
            self.record(file, batch)?;
            done.push(file.clone());
        }
        Ok(done)
    }

    /// Rolls back the most recent batch, newest name first, deleting each
    /// metadata row as its `down` step completes. Returns the reverted
    /// names; an empty metadata table is a no-op.
    pub fn rollback(&self) -> Result<Vec<String>> {
        self.ensure_migrations_table()?;

        let Some(batch) = self.last_batch()? else {
            warn!("nothing to roll back");
            return Ok(Vec::new());
        };

        let records = self
            .manager
            .table(MIGRATIONS_TABLE)?
            .where_eq("batch", batch)
            .order_by_desc("migration")
            .get()?;

        let schema = SchemaBuilder::new(self.manager.connection()?);
        let mut done = Vec::with_capacity(records.len());
        for record in records {
            let file = record.get_str("migration").unwrap_or_default().to_string();
            let migration = self.resolve(&file)?;
            info!(migration = %file, batch, "rolling back migration");
            migration.down(&schema)?;
            self.forget(&file)?;
            done.push(file);
        }
        Ok(done)
    }

    /// All persisted migration records, oldest first.
    pub fn records(&self) -> Result<Vec<MigrationRecord>> {
        self.ensure_migrations_table()?;
        let rows = self
            .manager
            .table(MIGRATIONS_TABLE)?
            .select(&["migration", "batch"])
            .order_by("migration")
            .get()?;
        Ok(rows
            .iter()
            .map(|row| MigrationRecord {
                migration: row.get_str("migration").unwrap_or_default().to_string(),
                batch: row.get_i64("batch").unwrap_or_default(),
            })
            .collect())
    }

    /// Creates the metadata table when absent.
    pub fn ensure_migrations_table(&self) -> Result<()> {
        let schema = SchemaBuilder::new(self.manager.connection()?);
        schema.create(MIGRATIONS_TABLE, |table| {
            table.increments("id");
            table.string("migration");
            table.integer("batch");
            table.timestamps();
        })
    }

    fn resolve(&self, file: &str) -> Result<Box<dyn Migration>> {
        let ident = migration_ident(file);
        self.registry
            .resolve(&ident)
            .ok_or_else(|| MigrateError::UnknownMigration {
                file: String::from(file),
                ident,
            })
    }

    fn applied_set(&self) -> Result<HashSet<String>> {
        let rows = self
            .manager
            .table(MIGRATIONS_TABLE)?
            .select(&["migration"])
            .get()?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_str("migration").map(String::from))
            .collect())
    }

    fn last_batch(&self) -> Result<Option<i64>> {
        let row = self
            .manager
            .table(MIGRATIONS_TABLE)?
            .select(&["MAX(batch) AS batch"])
            .first()?;
        Ok(row.and_then(|r| r.get_i64("batch")))
    }

    fn record(&self, file: &str, batch: i64) -> Result<()> {
        let now = Utc::now().format(DATETIME_FORMAT).to_string();
        self.manager.table(MIGRATIONS_TABLE)?.insert(Row::from_iter([
            ("migration", file.to_sql_value()),
            ("batch", batch.to_sql_value()),
            ("created_at", now.clone().to_sql_value()),
            ("updated_at", now.to_sql_value()),
        ]))?;
        Ok(())
    }

    fn forget(&self, file: &str) -> Result<()> {
        self.manager
            .table(MIGRATIONS_TABLE)?
            .where_eq("migration", file)
            .delete()?;
        Ok(())
    }
}

impl std::fmt::Debug for MigrationRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Converts a migration file name to its TitleCase identifier.
///
/// The four leading underscore-separated timestamp segments
/// (`YYYY_MM_DD_HHMMSS`) are stripped and the remainder TitleCased:
/// `2024_01_01_000000_create_users_table` → `CreateUsersTable`.
#[must_use]
pub fn migration_ident(file: &str) -> String {
    let base = file.split('.').next().unwrap_or(file);
    base.split('_')
        .skip(4)
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect()
}
