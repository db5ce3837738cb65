//! Error types for dialects, type mapping and comparison.

use crate::schema::TypeCode;

/// Errors raised while configuring a dialect or rendering SQL with it.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Invalid dialect configuration detected at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A type code or native name was registered twice.
    #[error("Duplicate registration of '{name}' in {dialect} type registry")]
    DuplicateRegistration {
        /// Dialect owning the registry.
        dialect: String,
        /// The duplicated type code or native name.
        name: String,
    },

    /// No native type template covers the requested type.
    #[error("No {dialect} type mapping for {type_code} with length {length:?}")]
    UnmappedType {
        /// Dialect owning the registry.
        dialect: String,
        /// Requested type code.
        type_code: TypeCode,
        /// Requested length (or precision).
        length: Option<u32>,
    },

    /// The platform does not support the requested operation.
    #[error("{dialect} does not support {operation}")]
    Unsupported {
        /// Dialect name.
        dialect: String,
        /// Operation that was requested.
        operation: String,
    },
}

impl DbError {
    /// Creates an [`DbError::Unsupported`] error.
    #[must_use]
    pub fn unsupported(dialect: &str, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect: dialect.to_string(),
            operation: operation.into(),
        }
    }

    /// Returns whether this is a capability error.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DbError>;
