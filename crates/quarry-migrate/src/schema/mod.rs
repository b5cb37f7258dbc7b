//! DDL emission: blueprints rendered and executed on a connection.

mod blueprint;

pub use blueprint::{Blueprint, ColumnDefinition, ColumnType, DefaultValue, ForeignKeyDefinition};

use std::rc::Rc;

use tracing::info;

use quarry_sqlite::Connection;

use crate::error::{MigrateError, Result};

/// Executes schema changes described by [`Blueprint`]s.
pub struct SchemaBuilder {
    connection: Rc<Connection>,
}

impl SchemaBuilder {
    /// Creates a schema builder on one connection.
    #[must_use]
    pub fn new(connection: Rc<Connection>) -> Self {
        Self { connection }
    }

    /// Creates a table: `CREATE TABLE IF NOT EXISTS` with every declared
    /// column, an optional composite primary key, and one constraint clause
    /// per registered foreign key.
    pub fn create(&self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);

        let sql = create_table_sql(&blueprint)?;
        info!(table, "creating table");
        self.connection.execute(&sql, &[])?;
        Ok(())
    }

    /// Adds columns to an existing table, one `ALTER TABLE ... ADD` per
    /// declared column. Dropping or modifying columns is out of scope.
    pub fn table(&self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);

        for column in blueprint.columns() {
            let sql = add_column_sql(table, column);
            info!(table, column = column.name(), "adding column");
            self.connection.execute(&sql, &[])?;
        }
        Ok(())
    }

    /// Drops a table if it exists.
    pub fn drop(&self, table: &str) -> Result<()> {
        info!(table, "dropping table");
        self.connection
            .execute(&format!("DROP TABLE IF EXISTS {table}"), &[])?;
        Ok(())
    }

    /// Alias for [`drop`](Self::drop); both tolerate a missing table.
    pub fn drop_if_exists(&self, table: &str) -> Result<()> {
        self.drop(table)
    }

    /// The connection DDL executes on.
    #[must_use]
    pub fn connection(&self) -> &Rc<Connection> {
        &self.connection
    }
}

/// Renders the CREATE TABLE statement for a blueprint.
pub fn create_table_sql(blueprint: &Blueprint) -> Result<String> {
    let mut clauses: Vec<String> = blueprint
        .columns()
        .iter()
        .map(ColumnDefinition::ddl)
        .collect();

    if !blueprint.primary_keys().is_empty() {
        clauses.push(format!(
            "PRIMARY KEY ({})",
            blueprint.primary_keys().join(", ")
        ));
    }

    for foreign_key in blueprint.foreign_keys() {
        let clause = foreign_key.ddl().ok_or_else(|| MigrateError::IncompleteForeignKey {
            table: String::from(blueprint.table()),
            column: String::from(foreign_key.column()),
        })?;
        clauses.push(clause);
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        blueprint.table(),
        clauses.join(", ")
    ))
}

/// Renders one ALTER TABLE ADD clause.
#[must_use]
pub fn add_column_sql(table: &str, column: &ColumnDefinition) -> String {
    format!("ALTER TABLE {table} ADD {}", column.ddl())
}
