//! # oxide-db
//!
//! Database platform dialects, type mapping and schema comparison.
//!
//! This crate provides:
//! - A platform-neutral schema model shared by declared and live schemas
//! - Per-vendor type registries with length-bounded native templates
//! - Dialects for PostgreSQL, MySQL, Oracle, H2, Derby, SQL Server and
//!   SQLite that render DDL and the least destructive column alterations
//! - A comparator that turns the difference between a declared and a live
//!   schema into an additive change set
//!
//! It performs no I/O: reading live schemas and executing statements is
//! the job of `oxide-upgrade`.
//!
//! ## Comparing schemas
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_db::prelude::*;
//!
//! let dialect = Arc::new(PostgresDialect::new().unwrap());
//! let comparator = GenericComparator::new(dialect.clone());
//!
//! let live = Schema {
//!     tables: vec![Table::new("users")
//!         .column(Column::new("id", TypeCode::BigInt).primary_key())
//!         .column(Column::new("email", TypeCode::Varchar).length(50))],
//!     ..Schema::default()
//! };
//! let declared = Schema {
//!     tables: vec![Table::new("users")
//!         .column(Column::new("id", TypeCode::BigInt).primary_key())
//!         .column(Column::new("email", TypeCode::Varchar).length(100).unique())],
//!     ..Schema::default()
//! };
//!
//! let changes = comparator.compare(&declared, &live).unwrap();
//! let sql = dialect.generate_sql(&changes.changes[0]).unwrap();
//! assert_eq!(
//!     sql,
//!     vec![
//!         "ALTER TABLE users ADD UNIQUE(email)",
//!         "ALTER TABLE users ALTER COLUMN email TYPE varchar(100)",
//!     ]
//! );
//! ```

pub mod changes;
pub mod comparator;
pub mod dialect;
pub mod error;
pub mod schema;
pub mod types;

pub use changes::{ChangeSet, ChangeWarning, SchemaChange};
pub use comparator::{Comparator, GenericComparator};
pub use dialect::Dialect;
pub use error::{DbError, Result};
pub use schema::{Column, Schema, Sequence, Table, TableName, TypeCode};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::changes::{
        ChangeSet, ChangeWarning, ColumnDefinitionChange, ColumnProperty, ColumnPropertyChange,
        SchemaChange, SkipReason,
    };
    pub use crate::comparator::{Comparator, GenericComparator};
    pub use crate::dialect::{
        DerbyDialect, Dialect, H2Dialect, Limit, LimitedSql, MySqlDialect, OracleDialect,
        PostgresDialect, SequenceDialect, SqlServerDialect, SqliteDialect,
    };
    pub use crate::error::{DbError, Result};
    pub use crate::schema::{
        Column, DefaultValue, ForeignKey, ForeignKeyRule, Index, Schema, Sequence, Table,
        TableName, TypeCode, TypeFamily,
    };
    pub use crate::types::{NativeType, TypeRegistry};
}
