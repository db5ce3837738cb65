//! Platform registry.
//!
//! A [`Platform`] bundles everything needed to upgrade one vendor: its
//! [`Dialect`], [`MetadataReader`] and [`Comparator`]. The registry picks
//! a platform from the product name the database reports.

use std::fmt;
use std::sync::Arc;

use oxide_db::comparator::{Comparator, GenericComparator};
use oxide_db::dialect::{
    DerbyDialect, Dialect, H2Dialect, MySqlDialect, OracleDialect, PostgresDialect,
    SqlServerDialect, SqliteDialect,
};
use oxide_db::schema::TableName;
use oxide_db::Schema;
use tracing::debug;

use crate::connection::DbConnection;
use crate::error::{Result, UpgradeError};
use crate::reader::{
    DerbyReader, H2Reader, MetadataReader, MySqlReader, OracleReader, PostgresReader,
    SchemaReader, SqlServerReader, SqliteReader,
};

/// Dialect, reader and comparator of one database vendor.
#[derive(Clone)]
pub struct Platform {
    name: String,
    product_names: Vec<String>,
    dialect: Arc<dyn Dialect>,
    reader: Arc<dyn MetadataReader>,
    comparator: Arc<dyn Comparator>,
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("name", &self.name)
            .field("product_names", &self.product_names)
            .finish_non_exhaustive()
    }
}

impl Platform {
    /// Creates a platform using the generic comparator.
    ///
    /// `product_names` are matched case-insensitively as substrings of
    /// the product name reported by the database.
    #[must_use]
    pub fn new<D, R>(name: impl Into<String>, product_names: &[&str], dialect: D, reader: R) -> Self
    where
        D: Dialect + 'static,
        R: MetadataReader + 'static,
    {
        let dialect: Arc<dyn Dialect> = Arc::new(dialect);
        Self {
            name: name.into(),
            product_names: product_names.iter().map(|p| p.to_ascii_lowercase()).collect(),
            comparator: Arc::new(GenericComparator::new(dialect.clone())),
            dialect,
            reader: Arc::new(reader),
        }
    }

    /// Replaces the comparator.
    #[must_use]
    pub fn with_comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Platform name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-case product name fragments identifying this platform.
    #[must_use]
    pub fn product_names(&self) -> &[String] {
        &self.product_names
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    #[must_use]
    pub fn reader(&self) -> &dyn MetadataReader {
        self.reader.as_ref()
    }

    #[must_use]
    pub fn comparator(&self) -> &dyn Comparator {
        self.comparator.as_ref()
    }

    /// Returns whether this platform handles the given product name.
    #[must_use]
    pub fn matches(&self, product_name: &str) -> bool {
        let product = product_name.to_ascii_lowercase();
        self.product_names.iter().any(|p| product.contains(p.as_str()))
    }

    /// Reads the live schema through this platform's reader.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Introspection`] if a metadata query fails.
    pub async fn read_schema(
        &self,
        conn: &dyn DbConnection,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
    ) -> Result<Schema> {
        SchemaReader::new(self.dialect(), self.reader())
            .read_schema(conn, catalog, schema_pattern)
            .await
    }

    /// Returns whether a live table holds rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn has_rows(&self, conn: &dyn DbConnection, table: &TableName) -> Result<bool> {
        SchemaReader::new(self.dialect(), self.reader())
            .has_rows(conn, table)
            .await
    }
}

/// Known platforms, searched in registration order.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            platforms: Vec::new(),
        }
    }

    /// Creates a registry with every built-in platform.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a dialect fails to build.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry
            .register(Platform::new("PostgreSQL", &["postgres"], PostgresDialect::new()?, PostgresReader))
            .register(Platform::new("MySQL", &["mysql", "mariadb"], MySqlDialect::new()?, MySqlReader))
            .register(Platform::new("Oracle", &["oracle"], OracleDialect::new()?, OracleReader))
            .register(Platform::new("H2", &["h2"], H2Dialect::new()?, H2Reader))
            .register(Platform::new("Derby", &["derby"], DerbyDialect::new()?, DerbyReader))
            .register(Platform::new(
                "SQLServer",
                &["microsoft sql server", "sql server"],
                SqlServerDialect::new()?,
                SqlServerReader,
            ))
            .register(Platform::new("SQLite", &["sqlite"], SqliteDialect::new()?, SqliteReader));
        Ok(registry)
    }

    /// Adds a platform. Platforms registered earlier win on ambiguous
    /// product names.
    pub fn register(&mut self, platform: Platform) -> &mut Self {
        debug!(platform = %platform.name, "Registering platform");
        self.platforms.push(platform);
        self
    }

    /// Returns the platform matching a database product name.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::UnsupportedPlatform`] if none matches.
    pub fn detect(&self, product_name: &str) -> Result<&Platform> {
        self.platforms
            .iter()
            .find(|p| p.matches(product_name))
            .ok_or_else(|| UpgradeError::UnsupportedPlatform(product_name.to_string()))
    }

    /// Returns the platform with the given name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns every registered platform.
    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }
}
