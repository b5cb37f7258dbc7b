//! Table blueprints: column and constraint declarations before DDL exists.

use quarry_core::{SqlValue, ToSqlValue};

/// Column type tags.
///
/// One tag maps to one DDL type string for every backend, deliberately
/// simple. The mapping leans SQLite (the shipped backend), so the emitted
/// DDL executes as-is; a production port would branch per dialect here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer primary key.
    Increments,
    /// Variable-length string.
    String {
        /// Maximum length.
        length: u32,
    },
    /// Unbounded text.
    Text,
    /// 32-bit style integer.
    Integer,
    /// 64-bit style integer.
    BigInteger,
    /// Fixed-point decimal.
    Decimal {
        /// Total digits.
        precision: u8,
        /// Fractional digits.
        scale: u8,
    },
    /// Boolean.
    Boolean,
    /// Date and time.
    Timestamp,
    /// Date only.
    Date,
    /// JSON document.
    Json,
}

impl ColumnType {
    /// The DDL type string.
    #[must_use]
    pub fn ddl(&self) -> String {
        match self {
            Self::Increments => String::from("INTEGER PRIMARY KEY AUTOINCREMENT"),
            Self::String { length } => format!("VARCHAR({length})"),
            Self::Text => String::from("TEXT"),
            Self::Integer => String::from("INTEGER"),
            Self::BigInteger => String::from("BIGINT"),
            Self::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Date => String::from("DATE"),
            Self::Json => String::from("JSON"),
        }
    }
}

/// A column default: either a literal value or a raw SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal, rendered escaped.
    Literal(SqlValue),
    /// A raw expression such as `CURRENT_TIMESTAMP`, rendered verbatim.
    Expression(String),
}

impl DefaultValue {
    fn ddl(&self) -> String {
        match self {
            Self::Literal(value) => value.to_sql_literal(),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// One declared column with its modifiers.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    column_type: ColumnType,
    name: String,
    nullable: bool,
    unique: bool,
    primary: bool,
    auto_increment: bool,
    default: Option<DefaultValue>,
}

impl ColumnDefinition {
    fn new(column_type: ColumnType, name: impl Into<String>) -> Self {
        Self {
            column_type,
            name: name.into(),
            nullable: false,
            unique: false,
            primary: false,
            auto_increment: false,
            default: None,
        }
    }

    /// Allows NULL.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Adds a UNIQUE constraint.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Marks this column the primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// Marks the column auto-incrementing.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Sets a literal default.
    pub fn default_value(&mut self, value: impl ToSqlValue) -> &mut Self {
        self.default = Some(DefaultValue::Literal(value.to_sql_value()));
        self
    }

    /// Sets a raw-expression default such as `CURRENT_TIMESTAMP`.
    pub fn default_expr(&mut self, expression: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Expression(expression.into()));
        self
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column type tag.
    #[must_use]
    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Renders the column clause of a CREATE/ALTER statement.
    #[must_use]
    pub fn ddl(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type.ddl());

        // Increments already carries its PRIMARY KEY AUTOINCREMENT.
        if self.primary && self.column_type != ColumnType::Increments {
            sql.push_str(" PRIMARY KEY");
        }
        if self.auto_increment && self.column_type != ColumnType::Increments {
            sql.push_str(" AUTOINCREMENT");
        }

        if self.nullable {
            sql.push_str(" NULL");
        } else {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.ddl());
        }

        if self.unique {
            sql.push_str(" UNIQUE");
        }

        sql
    }
}

/// A foreign key bound to one owning column.
#[derive(Debug, Clone)]
pub struct ForeignKeyDefinition {
    column: String,
    references: Option<String>,
    on: Option<String>,
    on_delete: String,
    on_update: String,
}

impl ForeignKeyDefinition {
    fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            references: None,
            on: None,
            on_delete: String::from("NO ACTION"),
            on_update: String::from("NO ACTION"),
        }
    }

    /// The referenced column.
    pub fn references(&mut self, column: impl Into<String>) -> &mut Self {
        self.references = Some(column.into());
        self
    }

    /// The referenced table.
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.on = Some(table.into());
        self
    }

    /// ON DELETE action (`CASCADE`, `SET NULL`, ...). Defaults to `NO ACTION`.
    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_delete = action.into();
        self
    }

    /// ON UPDATE action. Defaults to `NO ACTION`.
    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_update = action.into();
        self
    }

    /// The owning column.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Renders the constraint clause, if fully declared.
    pub(crate) fn ddl(&self) -> Option<String> {
        let references = self.references.as_deref()?;
        let on = self.on.as_deref()?;
        Some(format!(
            "CONSTRAINT fk_{column} FOREIGN KEY ({column}) REFERENCES {on}({references}) \
             ON DELETE {on_delete} ON UPDATE {on_update}",
            column = self.column,
            on_delete = self.on_delete,
            on_update = self.on_update,
        ))
    }
}

/// Accumulates a table's desired columns and keys before DDL is emitted.
#[derive(Debug, Clone)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDefinition>,
    primary_keys: Vec<String>,
    foreign_keys: Vec<ForeignKeyDefinition>,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    fn add_column(&mut self, column_type: ColumnType, name: &str) -> &mut ColumnDefinition {
        let index = self.columns.len();
        self.columns.push(ColumnDefinition::new(column_type, name));
        &mut self.columns[index]
    }

    /// Auto-incrementing `id` primary key.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        self.increments("id")
    }

    /// Auto-incrementing integer primary key.
    pub fn increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Increments, name)
    }

    /// String column with the default length of 255.
    pub fn string(&mut self, name: &str) -> &mut ColumnDefinition {
        self.string_len(name, 255)
    }

    /// String column with an explicit length.
    pub fn string_len(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.add_column(ColumnType::String { length }, name)
    }

    /// Text column.
    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Text, name)
    }

    /// Integer column.
    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Integer, name)
    }

    /// Big-integer column.
    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::BigInteger, name)
    }

    /// Decimal column.
    pub fn decimal(&mut self, name: &str, precision: u8, scale: u8) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Decimal { precision, scale }, name)
    }

    /// Boolean column.
    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Boolean, name)
    }

    /// Timestamp column.
    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Timestamp, name)
    }

    /// Date column.
    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Date, name)
    }

    /// JSON column.
    pub fn json(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Json, name)
    }

    /// `created_at` and `updated_at`, both defaulting to the current time.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").default_expr("CURRENT_TIMESTAMP");
        self.timestamp("updated_at").default_expr("CURRENT_TIMESTAMP");
    }

    /// Nullable `deleted_at` for soft deletes.
    pub fn soft_deletes(&mut self) -> &mut ColumnDefinition {
        let column = self.timestamp("deleted_at");
        column.nullable();
        column
    }

    /// Declares a foreign key on `column`; chain `references()` and `on()`.
    pub fn foreign(&mut self, column: &str) -> &mut ForeignKeyDefinition {
        let index = self.foreign_keys.len();
        self.foreign_keys.push(ForeignKeyDefinition::new(column));
        &mut self.foreign_keys[index]
    }

    /// Declares a composite table-level primary key.
    pub fn primary(&mut self, columns: &[&str]) {
        self.primary_keys = columns.iter().map(|c| String::from(*c)).collect();
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Composite primary key columns, if declared.
    #[must_use]
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// Registered foreign keys in order.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKeyDefinition] {
        &self.foreign_keys
    }
}
