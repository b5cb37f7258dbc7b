//! Active-record instances with dirty-attribute tracking.

use std::marker::PhantomData;

use chrono::Utc;
use tracing::debug;

use quarry_core::{Row, SqlValue, ToSqlValue, DATETIME_FORMAT};
use quarry_sqlite::{ConnectionManager, QueryBuilder};

use crate::error::{OrmError, Result};
use crate::model::Model;

/// One row of model `M`, held as a typed attribute bag.
///
/// A record is either fresh (built via [`new`](Self::new) /
/// [`with`](Self::with), no primary key yet) or hydrated from a query row
/// ([`hydrate`](Self::hydrate)). Alongside its attributes it keeps the
/// original snapshot (the last state known to be persisted) and
/// [`save`](Self::save) writes only the difference between the two.
///
/// Every operation takes the [`ConnectionManager`] explicitly; there is no
/// ambient "current connection".
#[derive(Debug, Clone)]
pub struct Record<M: Model> {
    attributes: Row,
    original: Row,
    _model: PhantomData<M>,
}

impl<M: Model> Default for Record<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Record<M> {
    /// An empty, unsaved record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: Row::new(),
            original: Row::new(),
            _model: PhantomData,
        }
    }

    /// An unsaved record pre-filled through the fillable whitelist.
    #[must_use]
    pub fn with(attributes: Row) -> Self {
        let mut record = Self::new();
        record.fill(attributes);
        record
    }

    /// Builds a record from a database row: attributes and original
    /// snapshot both take the row's values, so the record starts clean.
    #[must_use]
    pub fn hydrate(row: Row) -> Self {
        Self {
            attributes: row.clone(),
            original: row,
            _model: PhantomData,
        }
    }

    /// Copies in attributes, keeping only fillable keys. With an empty
    /// whitelist every key is accepted.
    pub fn fill(&mut self, attributes: Row) -> &mut Self {
        let fillable = M::fillable();
        for (column, value) in attributes {
            if fillable.is_empty() || fillable.contains(&column.as_str()) {
                self.attributes.set(column, value);
            }
        }
        self
    }

    /// Reads one attribute.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.attributes.get(column)
    }

    /// Writes one attribute.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToSqlValue) -> &mut Self {
        self.attributes.set(column, value);
        self
    }

    /// The full attribute bag.
    #[must_use]
    pub fn attributes(&self) -> &Row {
        &self.attributes
    }

    /// The primary key value, when present and non-NULL.
    #[must_use]
    pub fn primary_key(&self) -> Option<&SqlValue> {
        self.attributes
            .get(M::PRIMARY_KEY)
            .filter(|value| !value.is_null())
    }

    /// Attributes that differ from the original snapshot.
    #[must_use]
    pub fn dirty(&self) -> Row {
        self.attributes.diff(&self.original)
    }

    /// True when any attribute differs from the original snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty().is_empty()
    }

    /// A query builder scoped to this model's table.
    pub fn query(db: &ConnectionManager) -> Result<QueryBuilder> {
        Ok(db.table(M::TABLE)?)
    }

    /// Finds one record by primary key.
    pub fn find(db: &ConnectionManager, id: impl ToSqlValue) -> Result<Option<Self>> {
        Self::find_by(db, M::PRIMARY_KEY, id)
    }

    /// Finds one record by primary key, failing when absent.
    pub fn find_or_fail(db: &ConnectionManager, id: impl ToSqlValue) -> Result<Self> {
        Self::find(db, id)?.ok_or(OrmError::NotFound { model: M::TABLE })
    }

    /// Finds the first record matching `column = value`.
    pub fn find_by(
        db: &ConnectionManager,
        column: &str,
        value: impl ToSqlValue,
    ) -> Result<Option<Self>> {
        let row = Self::query(db)?.where_eq(column, value).first()?;
        Ok(row.map(Self::hydrate))
    }

    /// Every record in the table.
    pub fn all(db: &ConnectionManager) -> Result<Vec<Self>> {
        let rows = Self::query(db)?.get()?;
        Ok(rows.into_iter().map(Self::hydrate).collect())
    }

    /// Creates and persists a record in one step.
    pub fn create(db: &ConnectionManager, attributes: Row) -> Result<Self> {
        let mut record = Self::with(attributes);
        record.save(db)?;
        Ok(record)
    }

    /// Persists this record.
    ///
    /// With a primary key present: diff against the original snapshot; an
    /// empty diff issues no statement at all, otherwise only the changed
    /// columns are UPDATEd (refreshing `updated_at` when timestamps are on).
    /// Without a primary key: INSERT the full attribute set (stamping
    /// `created_at` / `updated_at`), read back the generated id, store it.
    /// Both paths end by resynchronizing the original snapshot.
    pub fn save(&mut self, db: &ConnectionManager) -> Result<()> {
        match self.primary_key().cloned() {
            Some(key) => self.perform_update(db, key),
            None => self.perform_insert(db),
        }
    }

    fn perform_insert(&mut self, db: &ConnectionManager) -> Result<()> {
        if M::TIMESTAMPS {
            let now = timestamp();
            self.attributes.set("created_at", now.clone());
            self.attributes.set("updated_at", now);
        }

        let id = Self::query(db)?.insert(self.attributes.clone())?;
        self.attributes.set(M::PRIMARY_KEY, id);
        self.original = self.attributes.clone();
        debug!(table = M::TABLE, id, "record inserted");
        Ok(())
    }

    fn perform_update(&mut self, db: &ConnectionManager, key: SqlValue) -> Result<()> {
        let mut changes = self.dirty();
        if changes.is_empty() {
            return Ok(());
        }

        if M::TIMESTAMPS {
            let now = timestamp();
            self.attributes.set("updated_at", now.clone());
            changes.set("updated_at", now);
        }

        Self::query(db)?
            .where_eq(M::PRIMARY_KEY, key)
            .update(changes)?;
        self.original = self.attributes.clone();
        debug!(table = M::TABLE, "record updated");
        Ok(())
    }

    /// Deletes this record.
    ///
    /// With a soft-delete column configured the column is set to the current
    /// time and saved; the row remains. Otherwise the row is removed by
    /// primary key.
    pub fn delete(&mut self, db: &ConnectionManager) -> Result<()> {
        if let Some(column) = M::SOFT_DELETE {
            self.attributes.set(column, timestamp());
            return self.save(db);
        }

        let key = self
            .primary_key()
            .cloned()
            .ok_or(OrmError::MissingPrimaryKey {
                model: M::TABLE,
                operation: "delete",
            })?;
        Self::query(db)?.where_eq(M::PRIMARY_KEY, key).delete()?;
        debug!(table = M::TABLE, "record deleted");
        Ok(())
    }

    /// Clears the soft-delete column and saves. Only valid when the model
    /// configures one.
    pub fn restore(&mut self, db: &ConnectionManager) -> Result<()> {
        let Some(column) = M::SOFT_DELETE else {
            return Err(OrmError::SoftDeletesDisabled { model: M::TABLE });
        };
        self.attributes.set(column, SqlValue::Null);
        self.save(db)
    }

    /// True when the soft-delete column holds a value.
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        M::SOFT_DELETE
            .and_then(|column| self.attributes.get(column))
            .is_some_and(|value| !value.is_null())
    }
}

fn timestamp() -> String {
    Utc::now().format(DATETIME_FORMAT).to_string()
}
