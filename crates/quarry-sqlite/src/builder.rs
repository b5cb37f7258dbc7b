//! Fluent query builder bound to a connection.

use std::rc::Rc;

use quarry_core::{Conjunction, Query, Row, SqlValue, ToSqlValue};

use crate::connection::Connection;
use crate::error::{DbError, Result};

/// Accumulates clause state fluently and executes it on a [`Connection`].
///
/// A builder is created per logical query, via
/// [`ConnectionManager::table`](crate::ConnectionManager::table), and
/// discarded after its terminal operation (`get`, `first`, `count`,
/// `insert`, `update`, `delete`).
///
/// # Example
///
/// ```ignore
/// let admins = db
///     .table("users")?
///     .select(&["id", "email"])
///     .where_eq("role", "admin")
///     .where_null("deleted_at")
///     .order_by_desc("id")
///     .get()?;
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    connection: Rc<Connection>,
    query: Query,
}

impl QueryBuilder {
    /// Creates a builder for `table` on `connection`.
    #[must_use]
    pub fn new(connection: Rc<Connection>, table: &str) -> Self {
        Self {
            connection,
            query: Query::new(table),
        }
    }

    /// Appends select columns. Without any, the query selects `*`.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.query.add_selects(columns);
        self
    }

    /// `column = value`, ANDed with the previous predicate.
    #[must_use]
    pub fn where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.where_op(column, "=", value)
    }

    /// `column = value`, ORed with the previous predicate.
    #[must_use]
    pub fn or_where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.or_where_op(column, "=", value)
    }

    /// `column operator value`, ANDed with the previous predicate.
    #[must_use]
    pub fn where_op(mut self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.query
            .push_compare(column, operator, value.to_sql_value(), Conjunction::And);
        self
    }

    /// `column operator value`, ORed with the previous predicate.
    #[must_use]
    pub fn or_where_op(mut self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.query
            .push_compare(column, operator, value.to_sql_value(), Conjunction::Or);
        self
    }

    /// `column IN (values)`. An empty list is a no-op.
    #[must_use]
    pub fn where_in<V: ToSqlValue>(mut self, column: &str, values: Vec<V>) -> Self {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.query.push_in(column, values, false);
        self
    }

    /// `column NOT IN (values)`. An empty list is a no-op.
    #[must_use]
    pub fn where_not_in<V: ToSqlValue>(mut self, column: &str, values: Vec<V>) -> Self {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.query.push_in(column, values, true);
        self
    }

    /// `column IS NULL`.
    #[must_use]
    pub fn where_null(mut self, column: &str) -> Self {
        self.query.push_null(column, false);
        self
    }

    /// `column IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.query.push_null(column, true);
        self
    }

    /// INNER JOIN.
    #[must_use]
    pub fn join(mut self, table: &str, on: &str) -> Self {
        self.query.push_join("INNER", table, on);
        self
    }

    /// LEFT JOIN.
    #[must_use]
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.query.push_join("LEFT", table, on);
        self
    }

    /// GROUP BY columns.
    #[must_use]
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.query.add_groups(columns);
        self
    }

    /// ORDER BY ascending.
    #[must_use]
    pub fn order_by(mut self, column: &str) -> Self {
        self.query.add_order(column, false);
        self
    }

    /// ORDER BY descending.
    #[must_use]
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.query.add_order(column, true);
        self
    }

    /// LIMIT.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.query.set_limit(n);
        self
    }

    /// OFFSET.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.query.set_offset(n);
        self
    }

    /// Renders the SELECT statement for the current state.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.query.to_sql()
    }

    /// Bindings in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> &[SqlValue] {
        self.query.bindings()
    }

    /// Executes the SELECT and returns every row.
    pub fn get(&self) -> Result<Vec<Row>> {
        self.connection
            .select(&self.query.to_sql(), self.query.bindings())
    }

    /// Executes with `LIMIT 1` and returns the first row, if any.
    pub fn first(&mut self) -> Result<Option<Row>> {
        self.query.set_limit(1);
        Ok(self.get()?.into_iter().next())
    }

    /// Counts matching rows.
    ///
    /// Swaps the select list for a `COUNT(*)` aggregate for one execution
    /// and restores it, leaving every other clause untouched, so the builder
    /// can still run its original query afterwards.
    pub fn count(&mut self) -> Result<i64> {
        let saved = self
            .query
            .replace_selects(vec![String::from("COUNT(*) AS aggregate")]);
        let result = self
            .connection
            .select_one(&self.query.to_sql(), self.query.bindings());
        self.query.replace_selects(saved);

        let row = result?;
        Ok(row.and_then(|r| r.get_i64("aggregate")).unwrap_or(0))
    }

    /// True when at least one row matches.
    pub fn exists(&mut self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// Inserts one row and returns the generated id.
    pub fn insert(&self, values: Row) -> Result<i64> {
        let columns: Vec<String> = values.columns().map(String::from).collect();
        let bindings: Vec<SqlValue> = values.into_iter().map(|(_, value)| value).collect();
        let sql = self.query.insert_sql(&columns, 1);
        self.connection.insert(&sql, &bindings)
    }

    /// Inserts many rows in one statement and returns the affected count.
    ///
    /// The column list comes from the first row; every other row must
    /// provide exactly those columns. Bindings are flattened row-major.
    pub fn insert_many(&self, rows: &[Row]) -> Result<usize> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let columns: Vec<String> = first.columns().map(String::from).collect();

        let mut bindings = Vec::with_capacity(columns.len() * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                let unexpected = row
                    .columns()
                    .find(|c| !columns.iter().any(|known| known.as_str() == *c))
                    .unwrap_or_default();
                return Err(DbError::ColumnMismatch {
                    row: index,
                    column: String::from(unexpected),
                });
            }
            for column in &columns {
                let value = row.get(column).ok_or_else(|| DbError::ColumnMismatch {
                    row: index,
                    column: column.clone(),
                })?;
                bindings.push(value.clone());
            }
        }

        let sql = self.query.insert_sql(&columns, rows.len());
        self.connection.execute(&sql, &bindings)
    }

    /// Updates the accumulated WHERE scope with `values`, returning the
    /// affected count. An empty WHERE deliberately updates every row.
    pub fn update(&self, values: Row) -> Result<usize> {
        if values.is_empty() {
            return Ok(0);
        }
        let columns: Vec<String> = values.columns().map(String::from).collect();
        let sql = self.query.update_sql(&columns);

        let mut bindings: Vec<SqlValue> = values.into_iter().map(|(_, value)| value).collect();
        bindings.extend(self.query.bindings().iter().cloned());
        self.connection.execute(&sql, &bindings)
    }

    /// Deletes the accumulated WHERE scope, returning the affected count.
    /// An empty WHERE deliberately deletes every row.
    pub fn delete(&self) -> Result<usize> {
        self.connection
            .execute(&self.query.delete_sql(), self.query.bindings())
    }

    /// The connection this builder executes on.
    #[must_use]
    pub fn connection(&self) -> &Rc<Connection> {
        &self.connection
    }
}
