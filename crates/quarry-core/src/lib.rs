//! # quarry-core
//!
//! Driver-agnostic foundation of the quarry data-access engine:
//!
//! - [`SqlValue`] / [`ToSqlValue`]: scalar values bound positionally to
//!   statement placeholders
//! - [`Row`]: ordered column/value maps returned by queries
//! - [`Query`]: clause accumulation and SQL rendering for SELECT, INSERT,
//!   UPDATE and DELETE
//!
//! This crate renders statements but never executes them; execution lives in
//! the driver layer (`quarry-sqlite`), which pairs a [`Query`] with a
//! connection.
//!
//! # Example
//!
//! ```rust
//! use quarry_core::{Conjunction, Query, ToSqlValue};
//!
//! let mut query = Query::new("users");
//! query.add_selects(&["id", "email"]);
//! query.push_compare("active", "=", true.to_sql_value(), Conjunction::And);
//!
//! assert_eq!(query.to_sql(), "SELECT id, email FROM users WHERE active = ?");
//! assert_eq!(query.bindings().len(), 1);
//! ```

pub mod query;
pub mod row;
pub mod value;

pub use query::{placeholder_count, Conjunction, Query};
pub use row::Row;
pub use value::{SqlValue, ToSqlValue, DATETIME_FORMAT};
