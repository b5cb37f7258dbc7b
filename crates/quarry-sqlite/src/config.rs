//! Connection configuration entries.
//!
//! The application supplies a [`config::Config`]; entries live under the
//! dotted key path `database.connections.<name>` and the default connection
//! name under `database.default`.

use serde::Deserialize;

use crate::error::{DbError, Result};

/// One named connection entry.
///
/// Host, port and credentials are carried for parity with server backends;
/// the SQLite driver only reads `database` (a file path, or `:memory:`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    /// Backend driver id, e.g. `sqlite`.
    pub driver: String,
    /// Database name or file path.
    #[serde(default)]
    pub database: String,
    /// Server host, unused by SQLite.
    #[serde(default)]
    pub host: Option<String>,
    /// Server port, unused by SQLite.
    #[serde(default)]
    pub port: Option<u16>,
    /// Username, unused by SQLite.
    #[serde(default)]
    pub username: Option<String>,
    /// Password, unused by SQLite.
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Settings for a SQLite database at `path` (`:memory:` for in-memory).
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: String::from("sqlite"),
            database: path.into(),
            host: None,
            port: None,
            username: None,
            password: None,
        }
    }
}

/// Backend drivers this build can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// SQLite, the only backend shipped.
    Sqlite,
}

impl Driver {
    /// Resolves a configured driver id.
    ///
    /// Ids from server backends (`mysql`, `mariadb`, `pgsql`) are recognized
    /// configuration, but no backend for them ships here, so they resolve to
    /// [`DbError::UnsupportedDriver`] like any unknown id.
    pub fn parse(id: &str) -> Result<Self> {
        match id {
            "sqlite" => Ok(Self::Sqlite),
            other => Err(DbError::UnsupportedDriver(String::from(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_driver_resolves() {
        assert_eq!(Driver::parse("sqlite").unwrap(), Driver::Sqlite);
    }

    #[test]
    fn server_drivers_are_unsupported() {
        for id in ["mysql", "mariadb", "pgsql", "oracle"] {
            assert!(matches!(
                Driver::parse(id),
                Err(DbError::UnsupportedDriver(_))
            ));
        }
    }

    #[test]
    fn settings_deserialize_from_dotted_config() {
        let cfg = config::Config::builder()
            .set_override("database.connections.main.driver", "sqlite")
            .unwrap()
            .set_override("database.connections.main.database", ":memory:")
            .unwrap()
            .build()
            .unwrap();

        let settings: ConnectionSettings = cfg.get("database.connections.main").unwrap();
        assert_eq!(settings.driver, "sqlite");
        assert_eq!(settings.database, ":memory:");
        assert!(settings.host.is_none());
    }
}
