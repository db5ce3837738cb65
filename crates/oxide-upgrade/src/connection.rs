//! Database connection contract.
//!
//! The upgrade engine only needs to run metadata queries and DDL
//! statements on one connection. [`DbConnection`] is that contract;
//! [`SqlxConnection`] implements it over an `sqlx` [`AnyPool`] for the
//! drivers `sqlx` ships (PostgreSQL, MySQL, SQLite). Other vendors plug
//! in by implementing the trait.

use std::fmt;

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column as _, Row as _};
use tracing::debug;

/// A single value of a metadata row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
}

impl SqlValue {
    /// Returns the value as text, if it is not NULL.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// Returns the value as an integer, parsing text if needed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(f.trunc() as i64),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the value as a flag. Accepts the catalog spellings
    /// `YES`/`NO`, `Y`/`N`, `TRUE`/`FALSE` and numbers.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(f.abs() > f64::EPSILON),
            Self::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
                "YES" | "Y" | "TRUE" | "T" | "1" => Some(true),
                "NO" | "N" | "FALSE" | "F" | "0" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A result row. Column lookup ignores case, since vendors disagree on
/// the case of unquoted aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Returns the value of a column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Returns a non-NULL column as trimmed text.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(SqlValue::as_text)
            .map(|s| s.trim().to_string())
    }

    /// Returns a non-NULL, non-empty column as text.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.text(name).filter(|s| !s.is_empty())
    }

    /// Returns a column as an integer.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SqlValue::as_int)
    }

    /// Returns a column as a flag.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(SqlValue::as_bool)
    }
}

/// One live database connection.
#[async_trait]
pub trait DbConnection: Send + Sync {
    /// Returns the product name reported by the database, used for
    /// platform detection.
    fn product_name(&self) -> &str;

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    async fn query(&self, sql: &str) -> std::result::Result<Vec<Row>, sqlx::Error>;

    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the statement fails.
    async fn execute(&self, sql: &str) -> std::result::Result<u64, sqlx::Error>;
}

/// [`DbConnection`] over an `sqlx` pool of at most one connection.
#[derive(Clone)]
pub struct SqlxConnection {
    pool: AnyPool,
    product_name: String,
}

impl fmt::Debug for SqlxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlxConnection")
            .field("product_name", &self.product_name)
            .finish_non_exhaustive()
    }
}

impl SqlxConnection {
    /// Connects to a database URL such as `postgres://localhost/app` or
    /// `sqlite::memory:`.
    ///
    /// The pool keeps a single connection alive for its whole lifetime,
    /// so an in-memory SQLite database survives between statements.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the connection fails.
    pub async fn connect(url: &str) -> std::result::Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await?;
        let product_name = pool.acquire().await?.backend_name().to_string();
        debug!(product = %product_name, "Connected");
        Ok(Self { pool, product_name })
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl DbConnection for SqlxConnection {
    fn product_name(&self) -> &str {
        &self.product_name
    }

    async fn query(&self, sql: &str) -> std::result::Result<Vec<Row>, sqlx::Error> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn execute(&self, sql: &str) -> std::result::Result<u64, sqlx::Error> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn convert_row(row: &AnyRow) -> Row {
    Row {
        columns: row
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name().to_string(), decode(row, i)))
            .collect(),
    }
}

/// Decodes a value whatever its driver type. Catalog columns mix text,
/// integers of every width and booleans.
fn decode(row: &AnyRow, index: usize) -> SqlValue {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map_or(SqlValue::Null, SqlValue::Text);
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or(SqlValue::Null, SqlValue::Int);
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return value.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)));
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return value.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map_or(SqlValue::Null, SqlValue::Bool);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or(SqlValue::Null, SqlValue::Float);
    }
    SqlValue::Null
}
