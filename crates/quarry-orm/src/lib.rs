//! # quarry-orm
//!
//! Active-record entity mapping for the quarry data-access engine.
//!
//! A model is a descriptor type implementing [`Model`]; its rows are held by
//! [`Record<M>`], a typed attribute bag with an original snapshot for dirty
//! tracking. Finders hydrate records through the connection manager and the
//! query builder; `save()` diffs against the snapshot and writes only what
//! changed.
//!
//! # Quick start
//!
//! ```ignore
//! use quarry_orm::{Model, Record};
//! use quarry_sqlite::{ConnectionManager, Row};
//!
//! struct User;
//!
//! impl Model for User {
//!     const TABLE: &'static str = "users";
//!     const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
//! }
//!
//! fn example(db: &ConnectionManager) -> quarry_orm::Result<()> {
//!     let mut user = Record::<User>::create(
//!         db,
//!         Row::from_iter([("name", "alice"), ("email", "alice@example.com")]),
//!     )?;
//!
//!     user.set("name", "alice b");
//!     user.save(db)?; // UPDATEs only the name (and updated_at)
//!
//!     user.delete(db)?; // soft delete: stamps deleted_at, row remains
//!     user.restore(db)?;
//!
//!     let found = Record::<User>::find(db, 1)?;
//!     assert!(found.is_some());
//!     Ok(())
//! }
//! ```

mod error;
mod model;
mod record;
mod relations;

pub use error::{OrmError, Result};
pub use model::Model;
pub use record::Record;
pub use relations::singular;

// Re-export the types model code touches constantly.
pub use quarry_core::{Row, SqlValue, ToSqlValue};
