//! Clause state and SQL rendering for data statements.
//!
//! [`Query`] accumulates SELECT / WHERE / JOIN / ORDER state and renders one
//! statement plus its positional bindings. It is a plain mutable builder; the
//! driver layer wraps it with a connection and the fluent surface.
//!
//! Rendering keeps two invariants:
//! - clause order is fixed: SELECT, FROM, JOIN, WHERE, GROUP BY, ORDER BY,
//!   LIMIT, OFFSET;
//! - the rendered placeholder count equals the binding count, in the exact
//!   left-to-right order the clauses were added. A mismatch is a programming
//!   error and aborts at render time.

use crate::value::SqlValue;

/// How a predicate joins with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    /// `AND` (the default).
    And,
    /// `OR`.
    Or,
}

impl Conjunction {
    const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One WHERE predicate, in insertion order.
#[derive(Debug, Clone)]
enum Predicate {
    /// `column operator ?` with one binding.
    Compare {
        column: String,
        operator: String,
        conjunction: Conjunction,
    },
    /// A pre-rendered fragment (IN lists, NULL checks). Bindings, if any,
    /// were appended when the fragment was pushed.
    Raw {
        fragment: String,
        conjunction: Conjunction,
    },
}

impl Predicate {
    fn sql(&self) -> String {
        match self {
            Self::Compare { column, operator, .. } => format!("{column} {operator} ?"),
            Self::Raw { fragment, .. } => fragment.clone(),
        }
    }

    const fn conjunction(&self) -> Conjunction {
        match self {
            Self::Compare { conjunction, .. } | Self::Raw { conjunction, .. } => *conjunction,
        }
    }
}

/// Accumulated clause state for one logical statement.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    selects: Vec<String>,
    wheres: Vec<Predicate>,
    joins: Vec<String>,
    groups: Vec<String>,
    orders: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    bindings: Vec<SqlValue>,
}

impl Query {
    /// Creates clause state targeting one table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            selects: Vec::new(),
            wheres: Vec::new(),
            joins: Vec::new(),
            groups: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            bindings: Vec::new(),
        }
    }

    /// The target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Appends select columns. An empty accumulated list renders as `*`.
    pub fn add_selects(&mut self, columns: &[&str]) {
        self.selects.extend(columns.iter().map(|c| String::from(*c)));
    }

    /// Swaps the whole select list, returning the previous one.
    ///
    /// Lets `count()` substitute its aggregate and restore the caller's
    /// columns afterwards without touching any other clause.
    pub fn replace_selects(&mut self, selects: Vec<String>) -> Vec<String> {
        std::mem::replace(&mut self.selects, selects)
    }

    /// Appends a `column operator ?` predicate and its binding.
    pub fn push_compare(
        &mut self,
        column: &str,
        operator: &str,
        value: SqlValue,
        conjunction: Conjunction,
    ) {
        self.wheres.push(Predicate::Compare {
            column: String::from(column),
            operator: String::from(operator),
            conjunction,
        });
        self.bindings.push(value);
    }

    /// Appends an IN / NOT IN predicate, one placeholder and binding per
    /// value. An empty value list is a no-op, so chained filters degrade
    /// gracefully.
    pub fn push_in(&mut self, column: &str, values: Vec<SqlValue>, negated: bool) {
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        let keyword = if negated { "NOT IN" } else { "IN" };
        self.wheres.push(Predicate::Raw {
            fragment: format!("{column} {keyword} ({placeholders})"),
            conjunction: Conjunction::And,
        });
        self.bindings.extend(values);
    }

    /// Appends an IS NULL / IS NOT NULL predicate. No binding.
    pub fn push_null(&mut self, column: &str, negated: bool) {
        let keyword = if negated { "IS NOT NULL" } else { "IS NULL" };
        self.wheres.push(Predicate::Raw {
            fragment: format!("{column} {keyword}"),
            conjunction: Conjunction::And,
        });
    }

    /// Appends a join clause, e.g. `push_join("LEFT", "orders o", "o.user_id = u.id")`.
    pub fn push_join(&mut self, kind: &str, table: &str, on: &str) {
        self.joins.push(format!("{kind} JOIN {table} ON {on}"));
    }

    /// Appends group-by columns.
    pub fn add_groups(&mut self, columns: &[&str]) {
        self.groups.extend(columns.iter().map(|c| String::from(*c)));
    }

    /// Appends an order-by term.
    pub fn add_order(&mut self, column: &str, descending: bool) {
        let direction = if descending { "DESC" } else { "ASC" };
        self.orders.push(format!("{column} {direction}"));
    }

    /// Sets the LIMIT.
    pub fn set_limit(&mut self, n: u64) {
        self.limit = Some(n);
    }

    /// Sets the OFFSET.
    pub fn set_offset(&mut self, n: u64) {
        self.offset = Some(n);
    }

    /// Bindings in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> &[SqlValue] {
        &self.bindings
    }

    /// True once at least one predicate was added.
    #[must_use]
    pub fn has_wheres(&self) -> bool {
        !self.wheres.is_empty()
    }

    /// Renders the WHERE clause body, if any predicates exist.
    ///
    /// Each predicate is joined to the previous one with its own
    /// conjunction; the first predicate's conjunction is not rendered.
    #[must_use]
    pub fn where_sql(&self) -> Option<String> {
        if self.wheres.is_empty() {
            return None;
        }
        let mut clause = String::new();
        for (i, predicate) in self.wheres.iter().enumerate() {
            if i > 0 {
                clause.push(' ');
                clause.push_str(predicate.conjunction().keyword());
                clause.push(' ');
            }
            clause.push_str(&predicate.sql());
        }
        Some(clause)
    }

    /// Renders the SELECT statement for the accumulated state.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");

        if self.selects.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.selects.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if let Some(clause) = self.where_sql() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        if !self.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groups.join(", "));
        }

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }

        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        if let Some(n) = self.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }

        assert_bound(&sql, self.bindings.len());
        sql
    }

    /// Renders an INSERT with one VALUES group per row, all rows sharing
    /// `columns`. The caller supplies bindings flattened row-major.
    #[must_use]
    pub fn insert_sql(&self, columns: &[String], row_count: usize) -> String {
        let group = format!("({})", vec!["?"; columns.len()].join(", "));
        let values = vec![group; row_count].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {values}",
            self.table,
            columns.join(", "),
        );
        assert_bound(&sql, columns.len() * row_count);
        sql
    }

    /// Renders an UPDATE over `columns`, scoped by the accumulated WHERE
    /// state. Set bindings precede where bindings. An absent WHERE clause
    /// updates every row; callers opt into that deliberately.
    #[must_use]
    pub fn update_sql(&self, columns: &[String]) -> String {
        let assignments: Vec<String> = columns.iter().map(|c| format!("{c} = ?")).collect();
        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        if let Some(clause) = self.where_sql() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        assert_bound(&sql, columns.len() + self.bindings.len());
        sql
    }

    /// Renders a DELETE scoped by the accumulated WHERE state. An absent
    /// WHERE clause deletes every row; callers opt into that deliberately.
    #[must_use]
    pub fn delete_sql(&self) -> String {
        let mut sql = format!("DELETE FROM {}", self.table);
        if let Some(clause) = self.where_sql() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        assert_bound(&sql, self.bindings.len());
        sql
    }
}

/// Number of positional placeholders in a rendered statement.
#[must_use]
pub fn placeholder_count(sql: &str) -> usize {
    sql.bytes().filter(|b| *b == b'?').count()
}

fn assert_bound(sql: &str, bindings: usize) {
    let placeholders = placeholder_count(sql);
    assert_eq!(
        placeholders, bindings,
        "statement has {placeholders} placeholders but {bindings} bindings: {sql}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToSqlValue;

    fn v(value: impl ToSqlValue) -> SqlValue {
        value.to_sql_value()
    }

    #[test]
    fn bare_select_renders_star() {
        let query = Query::new("users");
        assert_eq!(query.to_sql(), "SELECT * FROM users");
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn clause_order_is_fixed() {
        let mut query = Query::new("users u");
        query.add_selects(&["u.id", "u.name"]);
        query.push_join("LEFT", "orders o", "o.user_id = u.id");
        query.push_compare("u.active", "=", v(true), Conjunction::And);
        query.add_groups(&["u.id"]);
        query.add_order("u.name", false);
        query.set_limit(10);
        query.set_offset(20);

        assert_eq!(
            query.to_sql(),
            "SELECT u.id, u.name FROM users u \
             LEFT JOIN orders o ON o.user_id = u.id \
             WHERE u.active = ? \
             GROUP BY u.id ORDER BY u.name ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(query.bindings().len(), 1);
    }

    #[test]
    fn predicates_join_with_their_own_conjunction() {
        let mut query = Query::new("users");
        query.push_compare("role", "=", v("admin"), Conjunction::And);
        query.push_compare("role", "=", v("editor"), Conjunction::Or);
        query.push_compare("active", "=", v(true), Conjunction::And);

        assert_eq!(
            query.where_sql().unwrap(),
            "role = ? OR role = ? AND active = ?"
        );
        assert_eq!(query.bindings().len(), 3);
    }

    #[test]
    fn in_list_binds_every_value_in_order() {
        let mut query = Query::new("users");
        query.push_in("id", vec![v(1), v(2), v(3)], false);
        query.push_in("role", vec![v("banned")], true);

        assert_eq!(
            query.where_sql().unwrap(),
            "id IN (?, ?, ?) AND role NOT IN (?)"
        );
        assert_eq!(
            query.bindings(),
            &[v(1), v(2), v(3), v("banned")]
        );
    }

    #[test]
    fn empty_in_list_is_a_no_op() {
        let mut query = Query::new("users");
        query.push_in("id", vec![], false);
        assert!(!query.has_wheres());
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn null_checks_bind_nothing() {
        let mut query = Query::new("users");
        query.push_null("deleted_at", false);
        query.push_null("email", true);

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE deleted_at IS NULL AND email IS NOT NULL"
        );
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn placeholders_match_bindings_across_mixed_predicates() {
        let mut query = Query::new("users");
        query.push_compare("name", "LIKE", v("a%"), Conjunction::And);
        query.push_null("deleted_at", false);
        query.push_in("role", vec![v("admin"), v("editor")], false);
        query.push_compare("age", ">=", v(21), Conjunction::Or);

        let sql = query.to_sql();
        assert_eq!(placeholder_count(&sql), query.bindings().len());
    }

    #[test]
    fn insert_sql_renders_one_group_per_row() {
        let query = Query::new("users");
        let columns = vec![String::from("name"), String::from("email")];
        assert_eq!(
            query.insert_sql(&columns, 2),
            "INSERT INTO users (name, email) VALUES (?, ?), (?, ?)"
        );
    }

    #[test]
    fn update_sql_scopes_by_where_state() {
        let mut query = Query::new("users");
        query.push_compare("id", "=", v(1), Conjunction::And);
        let columns = vec![String::from("name")];
        assert_eq!(
            query.update_sql(&columns),
            "UPDATE users SET name = ? WHERE id = ?"
        );
    }

    #[test]
    fn unscoped_update_and_delete_render_without_where() {
        let query = Query::new("sessions");
        assert_eq!(
            query.update_sql(&[String::from("expired")]),
            "UPDATE sessions SET expired = ?"
        );
        assert_eq!(query.delete_sql(), "DELETE FROM sessions");
    }

    #[test]
    fn select_swap_restores_cleanly() {
        let mut query = Query::new("users");
        query.add_selects(&["id", "name"]);
        query.push_compare("active", "=", v(true), Conjunction::And);
        let before = query.to_sql();

        let saved = query.replace_selects(vec![String::from("COUNT(*) AS aggregate")]);
        assert_eq!(
            query.to_sql(),
            "SELECT COUNT(*) AS aggregate FROM users WHERE active = ?"
        );
        query.replace_selects(saved);

        assert_eq!(query.to_sql(), before);
    }
}
