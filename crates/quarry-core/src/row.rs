//! Row maps returned by queries and used as the ORM attribute bag.

use crate::value::{SqlValue, ToSqlValue};

/// An ordered `column name -> value` map.
///
/// Insertion order is preserved so a row prints and serializes in the same
/// column order the statement produced. Lookup is linear; rows are small.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Sets a column, replacing any existing value for the same name.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToSqlValue) {
        let column = column.into();
        let value = value.to_sql_value();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.entries.push((column, value));
        }
    }

    /// Returns the value for a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Removes a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<SqlValue> {
        let idx = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns true if the column is present (even when NULL).
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == column)
    }

    /// Text accessor.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer accessor.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            SqlValue::Int(n) => Some(*n),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Float accessor. Integers widen.
    #[must_use]
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            SqlValue::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Boolean accessor. Integer 0/1 coerces, matching SQLite storage.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.get(column)? {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Entries whose value differs from (or is absent in) `other`.
    ///
    /// Order follows this row, so a diff renders deterministically.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Self {
        let mut changed = Self::new();
        for (name, value) in &self.entries {
            if other.get(name) != Some(value) {
                changed.set(name.clone(), value.clone());
            }
        }
        changed
    }

    /// Converts the row to a JSON object for upstream consumers.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K: Into<String>, V: ToSqlValue> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_iter([
            ("id", SqlValue::Int(1)),
            ("name", SqlValue::Text("alice".into())),
            ("active", SqlValue::Int(1)),
        ])
    }

    #[test]
    fn set_replaces_in_place() {
        let mut row = sample();
        row.set("name", "bob");
        assert_eq!(row.get_str("name"), Some("bob"));
        assert_eq!(row.len(), 3);
        // column order unchanged
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name", "active"]);
    }

    #[test]
    fn typed_accessors_coerce_sqlite_storage() {
        let row = sample();
        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.get_bool("active"), Some(true));
        assert_eq!(row.get_f64("id"), Some(1.0));
        assert_eq!(row.get_str("id"), None);
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn diff_reports_changed_and_new_entries() {
        let original = sample();
        let mut current = sample();
        current.set("name", "carol");
        current.set("email", "carol@example.com");

        let dirty = current.diff(&original);
        assert_eq!(dirty.len(), 2);
        assert_eq!(dirty.get_str("name"), Some("carol"));
        assert_eq!(dirty.get_str("email"), Some("carol@example.com"));

        assert!(original.diff(&original.clone()).is_empty());
    }

    #[test]
    fn json_object_keeps_values() {
        let row = sample();
        let json = row.to_json();
        assert_eq!(json["id"], serde_json::json!(1));
        assert_eq!(json["name"], serde_json::json!("alice"));
    }
}
