//! Simple entity relations: has-one, has-many, belongs-to.

use quarry_sqlite::ConnectionManager;

use crate::error::Result;
use crate::model::Model;
use crate::record::Record;

impl<M: Model> Record<M> {
    /// The single related `R` whose foreign key points at this record.
    ///
    /// The foreign key defaults to `<singular of this table>_<local key>`,
    /// e.g. a `users` record looks for `user_id` on the related table.
    pub fn has_one<R: Model>(
        &self,
        db: &ConnectionManager,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Option<Record<R>>> {
        let local_key = local_key.unwrap_or(M::PRIMARY_KEY);
        let foreign_key = foreign_key
            .map_or_else(|| format!("{}_{local_key}", singular(M::TABLE)), String::from);

        let Some(local) = self.get(local_key) else {
            return Ok(None);
        };
        let row = Record::<R>::query(db)?
            .where_eq(&foreign_key, local)
            .first()?;
        Ok(row.map(Record::hydrate))
    }

    /// Every related `R` whose foreign key points at this record.
    pub fn has_many<R: Model>(
        &self,
        db: &ConnectionManager,
        foreign_key: Option<&str>,
        local_key: Option<&str>,
    ) -> Result<Vec<Record<R>>> {
        let local_key = local_key.unwrap_or(M::PRIMARY_KEY);
        let foreign_key = foreign_key
            .map_or_else(|| format!("{}_{local_key}", singular(M::TABLE)), String::from);

        let Some(local) = self.get(local_key) else {
            return Ok(Vec::new());
        };
        let rows = Record::<R>::query(db)?
            .where_eq(&foreign_key, local)
            .get()?;
        Ok(rows.into_iter().map(Record::hydrate).collect())
    }

    /// The `R` this record's foreign key points at.
    ///
    /// The foreign key defaults to `<singular of related table>_id` on this
    /// record, e.g. a `posts` record follows its `user_id` to `users`.
    pub fn belongs_to<R: Model>(
        &self,
        db: &ConnectionManager,
        foreign_key: Option<&str>,
    ) -> Result<Option<Record<R>>> {
        let foreign_key = foreign_key
            .map_or_else(|| format!("{}_id", singular(R::TABLE)), String::from);

        let Some(reference) = self.get(&foreign_key) else {
            return Ok(None);
        };
        let row = Record::<R>::query(db)?
            .where_eq(R::PRIMARY_KEY, reference)
            .first()?;
        Ok(row.map(Record::hydrate))
    }
}

/// Singularizes a table name for default foreign-key derivation.
///
/// Suffix rules only, enough for conventional table names; models with
/// irregular plurals pass explicit keys instead.
#[must_use]
pub fn singular(word: &str) -> String {
    const RULES: &[(&str, &str)] = &[
        ("ies", "y"),
        ("ches", "ch"),
        ("shes", "sh"),
        ("sses", "ss"),
        ("xes", "x"),
        ("oes", "o"),
        ("s", ""),
    ];

    // Words already singular-looking ("status", "address") stay put.
    if word.ends_with("ss") || word.ends_with("us") {
        return String::from(word);
    }

    for (suffix, replacement) in RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{replacement}");
        }
    }
    String::from(word)
}
