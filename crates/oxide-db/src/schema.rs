//! Platform-neutral schema model.
//!
//! These types describe tables, columns, indexes, foreign keys and
//! sequences independently of any vendor. The same types hold both the
//! declared model (what the application expects) and the live model read
//! back from a database, so the comparator can diff one against the other.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic column type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeCode {
    /// Boolean.
    Boolean,
    /// Single bit.
    Bit,
    /// 8-bit integer.
    TinyInt,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Single precision floating point.
    Real,
    /// Floating point.
    Float,
    /// Double precision floating point.
    Double,
    /// Exact decimal with precision and scale.
    Decimal,
    /// Exact numeric with precision and scale.
    Numeric,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Long variable-length character string.
    LongVarchar,
    /// Character large object.
    Clob,
    /// Fixed-length binary data.
    Binary,
    /// Variable-length binary data.
    VarBinary,
    /// Long variable-length binary data.
    LongVarBinary,
    /// Binary large object.
    Blob,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    Timestamp,
    /// Vendor specific type, carried verbatim in [`Column::native_type`].
    Special,
}

/// Broad grouping of type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// BOOLEAN and BIT.
    Boolean,
    /// Integral numbers.
    Integer,
    /// Approximate numbers.
    Float,
    /// Exact numbers with precision and scale.
    Exact,
    /// Character data.
    Character,
    /// Binary data.
    Binary,
    /// Dates and times.
    Temporal,
    /// Vendor objects.
    Special,
}

impl TypeCode {
    /// Every type code, in declaration order.
    pub const ALL: [Self; 23] = [
        Self::Boolean,
        Self::Bit,
        Self::TinyInt,
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::Real,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Numeric,
        Self::Char,
        Self::Varchar,
        Self::LongVarchar,
        Self::Clob,
        Self::Binary,
        Self::VarBinary,
        Self::LongVarBinary,
        Self::Blob,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Special,
    ];

    /// Returns the upper-case name of this type code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Special => "SPECIAL",
        }
    }

    /// Returns the family this type code belongs to.
    #[must_use]
    pub const fn family(self) -> TypeFamily {
        match self {
            Self::Boolean | Self::Bit => TypeFamily::Boolean,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt => TypeFamily::Integer,
            Self::Real | Self::Float | Self::Double => TypeFamily::Float,
            Self::Decimal | Self::Numeric => TypeFamily::Exact,
            Self::Char | Self::Varchar | Self::LongVarchar | Self::Clob => TypeFamily::Character,
            Self::Binary | Self::VarBinary | Self::LongVarBinary | Self::Blob => {
                TypeFamily::Binary
            }
            Self::Date | Self::Time | Self::Timestamp => TypeFamily::Temporal,
            Self::Special => TypeFamily::Special,
        }
    }

    /// Returns whether columns of this type carry a length.
    #[must_use]
    pub const fn has_length(self) -> bool {
        matches!(
            self.family(),
            TypeFamily::Character | TypeFamily::Binary
        )
    }

    /// Returns whether columns of this type carry precision and scale.
    #[must_use]
    pub const fn has_precision(self) -> bool {
        matches!(self.family(), TypeFamily::Exact)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed column default.
///
/// Raw literals are classified once, when the model is built, so that
/// comparison never has to guess whether `'1'` is text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    /// Explicit NULL, which is the same as having no default.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Exact decimal literal, normalised.
    Decimal(String),
    /// Text literal, unquoted.
    Text(String),
    /// SQL expression such as `CURRENT_TIMESTAMP`.
    Expression(String),
}

const EXPRESSION_KEYWORDS: &[&str] = &[
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "SYSDATE",
    "SYSTIMESTAMP",
];

impl DefaultValue {
    /// Classifies a raw SQL literal for a column of the given type.
    #[must_use]
    pub fn from_literal(raw: &str, type_code: TypeCode) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Self::Null;
        }

        let family = type_code.family();
        let quoted = unquote_literal(trimmed);
        let value = quoted.as_deref().unwrap_or(trimmed);

        match family {
            TypeFamily::Boolean => {
                if let Some(b) = parse_bool(value) {
                    return Self::Boolean(b);
                }
            }
            TypeFamily::Integer | TypeFamily::Float | TypeFamily::Exact => {
                if let Some(number) = parse_number(value) {
                    return number;
                }
            }
            _ => {}
        }

        if let Some(text) = quoted {
            return Self::Text(text);
        }

        let is_keyword = EXPRESSION_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(trimmed));
        if is_keyword || trimmed.ends_with(')') {
            return Self::Expression(trimmed.to_string());
        }

        match family {
            TypeFamily::Character => Self::Text(trimmed.to_string()),
            _ => Self::Expression(trimmed.to_string()),
        }
    }

    /// Returns whether this default is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Strips surrounding single quotes and unescapes doubled quotes.
fn unquote_literal(value: &str) -> Option<String> {
    let inner = value.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" => Some(true),
        "false" | "0" | "f" => Some(false),
        _ => None,
    }
}

fn parse_number(value: &str) -> Option<DefaultValue> {
    let value = value.strip_prefix('+').unwrap_or(value);
    if let Ok(i) = value.parse::<i64>() {
        return Some(DefaultValue::Integer(i));
    }
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (int_part, frac_part) = digits.split_once('.')?;
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    let frac = frac_part.trim_end_matches('0');
    let int = if int_part.is_empty() { "0" } else { int_part };
    let sign = if value.starts_with('-') { "-" } else { "" };
    if frac.is_empty() {
        return Some(
            format!("{sign}{int}")
                .parse::<i64>()
                .map_or_else(|_| DefaultValue::Decimal(format!("{sign}{int}")), DefaultValue::Integer),
        );
    }
    Some(DefaultValue::Decimal(format!("{sign}{int}.{frac}")))
}

/// Foreign key update/delete rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForeignKeyRule {
    /// No action.
    #[default]
    NoAction,
    /// Cascade to referencing rows.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
    /// Set referencing columns to their default.
    SetDefault,
}

impl ForeignKeyRule {
    /// Translates a metadata rule code.
    ///
    /// Codes follow the standard `importedKey*` numbering; RESTRICT (1)
    /// behaves as NO ACTION.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Cascade,
            2 => Self::SetNull,
            4 => Self::SetDefault,
            _ => Self::NoAction,
        }
    }

    /// Translates a rule spelled the way `information_schema` reports it.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            _ => Self::NoAction,
        }
    }

    /// Returns the SQL spelling of this rule.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Generic type code.
    pub type_code: TypeCode,
    /// Vendor type name, used for [`TypeCode::Special`] columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_type: Option<String>,
    /// Length of character and binary columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Precision of exact numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Scale of exact numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Whether the column accepts NULL.
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether the column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether values are generated by the database.
    #[serde(default)]
    pub auto_increment: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Name of the live index or constraint enforcing `unique`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_index: Option<String>,
}

impl Column {
    /// Creates a nullable column of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            native_type: None,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            unique: false,
            primary_key: false,
            auto_increment: false,
            default: None,
            comment: None,
            unique_index: None,
        }
    }

    /// Creates a column of a vendor specific type.
    #[must_use]
    pub fn special(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            native_type: Some(native_type.into()),
            ..Self::new(name, TypeCode::Special)
        }
    }

    /// Sets the length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub const fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as (part of) the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column as auto-increment.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns whether the column accepts NULL once primary key
    /// membership is taken into account.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable && !self.primary_key
    }

    /// Returns whether the column is unique by itself, excluding primary
    /// key columns.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique && !self.primary_key
    }

    /// Returns the default, treating an explicit NULL as absent.
    #[must_use]
    pub fn effective_default(&self) -> Option<&DefaultValue> {
        self.default.as_ref().filter(|d| !d.is_null())
    }
}

/// A table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
        }
    }

    /// Marks the index as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Returns whether both indexes cover the same columns with the same
    /// uniqueness, ignoring names.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.unique == other.unique && same_names(&self.columns, &other.columns)
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub foreign_table: String,
    /// Referenced columns.
    pub foreign_columns: Vec<String>,
    /// ON UPDATE rule.
    #[serde(default)]
    pub on_update: ForeignKeyRule,
    /// ON DELETE rule.
    #[serde(default)]
    pub on_delete: ForeignKeyRule,
}

impl ForeignKey {
    /// Creates a foreign key with NO ACTION rules.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        foreign_table: impl Into<String>,
        foreign_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            foreign_table: foreign_table.into(),
            foreign_columns,
            on_update: ForeignKeyRule::NoAction,
            on_delete: ForeignKeyRule::NoAction,
        }
    }

    /// Sets the ON DELETE rule.
    #[must_use]
    pub const fn on_delete(mut self, rule: ForeignKeyRule) -> Self {
        self.on_delete = rule;
        self
    }

    /// Sets the ON UPDATE rule.
    #[must_use]
    pub const fn on_update(mut self, rule: ForeignKeyRule) -> Self {
        self.on_update = rule;
        self
    }

    /// Returns whether both keys link the same columns to the same
    /// target, ignoring names and rules.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.foreign_table.eq_ignore_ascii_case(&other.foreign_table)
            && same_names(&self.columns, &other.columns)
            && same_names(&self.foreign_columns, &other.foreign_columns)
    }
}

/// A possibly qualified table or sequence name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TableName {
    /// Catalog qualifier.
    pub catalog: Option<String>,
    /// Schema qualifier.
    pub schema: Option<String>,
    /// Object name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Returns the case-folded key used to match objects across models.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}

/// A table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Catalog qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Schema qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Table comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Primary key constraint name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key_name: Option<String>,
    /// Columns, in order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Secondary table reconciled together with this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Box<Table>>,
    /// Whether the live table holds rows. Only set on live tables, and
    /// only when a column change depends on it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_rows: bool,
}

impl Table {
    /// Creates an empty, unqualified table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
            comment: None,
            primary_key_name: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            secondary: None,
            has_rows: false,
        }
    }

    /// Marks the table as holding rows.
    #[must_use]
    pub const fn with_rows(mut self) -> Self {
        self.has_rows = true;
        self
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the catalog qualifier.
    #[must_use]
    pub fn in_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attaches a secondary table.
    #[must_use]
    pub fn secondary(mut self, table: Self) -> Self {
        self.secondary = Some(Box::new(table));
        self
    }

    /// Returns the qualified name of this table.
    #[must_use]
    pub fn qualified_name(&self) -> TableName {
        TableName {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    /// Finds a column by name, ignoring case.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Finds a column by name for modification, ignoring case.
    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns the primary key column names, in column order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// A sequence. Unset attributes are left to the database defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Catalog qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Schema qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Sequence name.
    pub name: String,
    /// Start value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Increment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<i64>,
    /// Minimum value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    /// Maximum value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    /// Number of values cached per session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<i64>,
    /// Whether the sequence wraps around.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<bool>,
}

impl Sequence {
    /// Creates a sequence with database default attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
            start: None,
            increment: None,
            min_value: None,
            max_value: None,
            cache: None,
            cycle: None,
        }
    }

    /// Sets the start value.
    #[must_use]
    pub const fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the increment.
    #[must_use]
    pub const fn increment(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    /// Sets the value bounds.
    #[must_use]
    pub const fn bounds(mut self, min_value: i64, max_value: i64) -> Self {
        self.min_value = Some(min_value);
        self.max_value = Some(max_value);
        self
    }

    /// Sets the cache size.
    #[must_use]
    pub const fn cache(mut self, cache: i64) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the cycle flag.
    #[must_use]
    pub const fn cycle(mut self, cycle: bool) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Returns the qualified name of this sequence.
    #[must_use]
    pub fn qualified_name(&self) -> TableName {
        TableName {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

/// A schema: a set of tables and sequences under one qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Catalog name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Schema name. `None` is the connection's default schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tables.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Sequences.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new(catalog: Option<String>, name: Option<String>) -> Self {
        Self {
            catalog,
            name,
            tables: Vec::new(),
            sequences: Vec::new(),
        }
    }

    /// Finds a table by name, ignoring case.
    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Finds a table by name for update, ignoring case.
    pub fn find_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Finds a sequence by name, ignoring case.
    #[must_use]
    pub fn find_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Returns every table including secondary tables, owners first.
    #[must_use]
    pub fn all_tables(&self) -> Vec<&Table> {
        let mut tables = Vec::new();
        for table in &self.tables {
            let mut current = Some(table);
            while let Some(t) = current {
                tables.push(t);
                current = t.secondary.as_deref();
            }
        }
        tables
    }

    /// Splits a declared model into schemas by qualifier.
    ///
    /// Unqualified objects land in the first, default schema. Each
    /// distinct (catalog, schema) pair gets its own schema, in the order
    /// it is first seen.
    #[must_use]
    pub fn partition(tables: Vec<Table>, sequences: Vec<Sequence>) -> Vec<Self> {
        let mut schemas = vec![Self::default()];
        for table in tables {
            let i = partition_slot(&mut schemas, table.catalog.as_ref(), table.schema.as_ref());
            schemas[i].tables.push(table);
        }
        for sequence in sequences {
            let i = partition_slot(
                &mut schemas,
                sequence.catalog.as_ref(),
                sequence.schema.as_ref(),
            );
            schemas[i].sequences.push(sequence);
        }
        schemas
    }
}

fn partition_slot(
    schemas: &mut Vec<Schema>,
    catalog: Option<&String>,
    schema: Option<&String>,
) -> usize {
    if catalog.is_none() && schema.is_none() {
        return 0;
    }
    let found = schemas
        .iter()
        .position(|s| eq_opt(s.catalog.as_ref(), catalog) && eq_opt(s.name.as_ref(), schema));
    found.unwrap_or_else(|| {
        schemas.push(Schema::new(catalog.cloned(), schema.cloned()));
        schemas.len() - 1
    })
}

fn eq_opt(a: Option<&String>, b: Option<&String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Compares two name lists element-wise, ignoring case.
#[must_use]
pub fn same_names(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}
