//! Named-connection resolution and caching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::info;

use crate::builder::QueryBuilder;
use crate::config::ConnectionSettings;
use crate::connection::Connection;
use crate::error::{DbError, Result};

/// Fallback default connection name when `database.default` is absent.
const DEFAULT_CONNECTION: &str = "sqlite";

/// Resolves symbolic connection names to cached [`Connection`]s.
///
/// Entries are read from the application [`config::Config`] under
/// `database.connections.<name>`; a connection is opened on first use and
/// cached by name for the manager's life. The manager is handed around
/// explicitly: components receive it through construction, never through a
/// global.
pub struct ConnectionManager {
    config: config::Config,
    current: String,
    connections: RefCell<HashMap<String, Rc<Connection>>>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("current", &self.current)
            .field("cached", &self.connections.borrow().len())
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Creates a manager over the application configuration.
    ///
    /// The current connection starts at `database.default`, falling back to
    /// `"sqlite"` when the key is absent.
    #[must_use]
    pub fn new(config: config::Config) -> Self {
        let current = config
            .get_string("database.default")
            .unwrap_or_else(|_| String::from(DEFAULT_CONNECTION));
        Self {
            config,
            current,
            connections: RefCell::new(HashMap::new()),
        }
    }

    /// The name of the current connection.
    #[must_use]
    pub fn current_connection(&self) -> &str {
        &self.current
    }

    /// Switches the current connection name for subsequent calls.
    pub fn use_connection(&mut self, name: impl Into<String>) -> &mut Self {
        self.current = name.into();
        self
    }

    /// Returns the current connection, opening it on first use.
    pub fn connection(&self) -> Result<Rc<Connection>> {
        let name = self.current.clone();
        self.connection_named(&name)
    }

    /// Returns a named connection, opening it on first use.
    pub fn connection_named(&self, name: &str) -> Result<Rc<Connection>> {
        if let Some(cached) = self.connections.borrow().get(name) {
            return Ok(Rc::clone(cached));
        }

        let key = format!("database.connections.{name}");
        let settings = match self.config.get::<ConnectionSettings>(&key) {
            Ok(settings) => settings,
            Err(config::ConfigError::NotFound(_)) => {
                return Err(DbError::UnknownConnection(String::from(name)));
            }
            Err(err) => return Err(DbError::Configuration(err)),
        };

        let connection = Rc::new(Connection::open(&settings)?);
        info!(name, database = connection.database(), "database connection opened");
        self.connections
            .borrow_mut()
            .insert(String::from(name), Rc::clone(&connection));
        Ok(connection)
    }

    /// A fresh query builder for `table` on the current connection.
    pub fn table(&self, table: &str) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(self.connection()?, table))
    }

    /// A fresh query builder for `table` on a named connection.
    pub fn table_on(&self, connection: &str, table: &str) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(self.connection_named(connection)?, table))
    }
}
