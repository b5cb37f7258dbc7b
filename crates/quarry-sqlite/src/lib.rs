//! # quarry-sqlite
//!
//! The SQLite driver layer of the quarry data-access engine:
//!
//! - [`Connection`]: one owned backend handle, parameterized execution,
//!   reference-counted transaction nesting
//! - [`ConnectionManager`]: named configuration entries resolved to cached
//!   connections, with a configurable default
//! - [`QueryBuilder`]: fluent clause accumulation executed on a connection
//! - [`SqlLoader`]: named `.sql` files run through a connection
//!
//! Everything here is synchronous and blocking. A connection wraps a
//! `rusqlite` handle, which is not `Sync`; callers that want concurrency
//! open per-thread connections rather than sharing one.
//!
//! # Example
//!
//! ```rust
//! use quarry_sqlite::ConnectionManager;
//!
//! let config = config::Config::builder()
//!     .set_override("database.default", "main")?
//!     .set_override("database.connections.main.driver", "sqlite")?
//!     .set_override("database.connections.main.database", ":memory:")?
//!     .build()?;
//!
//! let db = ConnectionManager::new(config);
//! let conn = db.connection()?;
//! conn.execute_script("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT)")?;
//!
//! let none = db.table("users")?.where_eq("email", "a@x.com").first()?;
//! assert!(none.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod config;
mod connection;
mod error;
mod loader;
mod manager;

pub use builder::QueryBuilder;
pub use config::{ConnectionSettings, Driver};
pub use connection::Connection;
pub use error::{DbError, Result};
pub use loader::SqlLoader;
pub use manager::ConnectionManager;

// Re-export the value and row types callers handle constantly.
pub use quarry_core::{Row, SqlValue, ToSqlValue};
