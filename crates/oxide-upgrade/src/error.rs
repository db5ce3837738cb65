//! Error types for reading and upgrading live schemas.

use oxide_db::DbError;

/// Errors that can occur while reading, comparing or upgrading a schema.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// Dialect, type mapping or capability error.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Database error outside introspection and execution, e.g. while
    /// connecting.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A metadata query failed. The partially read schema is discarded.
    #[error("Failed to read schema metadata with '{query}': {source}")]
    Introspection {
        /// The failing query.
        query: String,
        /// Driver error.
        source: sqlx::Error,
    },

    /// A DDL statement failed. Remaining statements were not executed.
    #[error("Failed to execute '{sql}': {source}")]
    Execution {
        /// The failing statement.
        sql: String,
        /// Driver error.
        source: sqlx::Error,
    },

    /// No registered platform matches the database product name.
    #[error("Unsupported database platform: {0}")]
    UnsupportedPlatform(String),

    /// Model (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading model files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for upgrade operations.
pub type Result<T> = std::result::Result<T, UpgradeError>;
