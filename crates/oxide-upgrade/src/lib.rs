//! # oxide-upgrade
//!
//! Reads live database schemas and upgrades them to a declared model.
//!
//! This crate provides:
//! - A small connection contract with an `sqlx` implementation
//! - Metadata readers for PostgreSQL, MySQL, Oracle, H2, Derby, SQL Server
//!   and SQLite
//! - A platform registry selecting dialect, reader and comparator from the
//!   product name the database reports
//! - An upgrade command that plans and executes (or prints) the additive
//!   DDL bringing the live schema in line with the model
//!
//! Upgrades never drop tables, columns, indexes or constraints. Changes
//! that could lose data are reported as warnings and left alone.
//!
//! ## Upgrading a database
//!
//! ```rust,no_run
//! use oxide_upgrade::prelude::*;
//!
//! # async fn run() -> oxide_upgrade::Result<()> {
//! let conn = SqlxConnection::connect("sqlite://app.db").await?;
//! let registry = PlatformRegistry::with_defaults()?;
//! let platform = registry.detect(conn.product_name())?.clone();
//!
//! let model = Model::load(std::path::Path::new("model.json"))?;
//! let command = UpgradeCommand::new(platform, UpgradeOptions::default());
//! let report = command.upgrade(&conn, &model.into_schemas()).await?;
//! println!("executed {} statements", report.executed);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod executor;
pub mod model;
pub mod platform;
pub mod reader;

pub use connection::{DbConnection, SqlxConnection};
pub use error::{Result, UpgradeError};
pub use executor::{UpgradeCommand, UpgradeOptions, UpgradeReport};
pub use model::Model;
pub use platform::{Platform, PlatformRegistry};
pub use reader::{MetadataReader, SchemaReader};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::connection::{DbConnection, Row, SqlValue, SqlxConnection};
    pub use crate::error::{Result, UpgradeError};
    pub use crate::executor::{UpgradeCommand, UpgradeOptions, UpgradeReport};
    pub use crate::model::Model;
    pub use crate::platform::{Platform, PlatformRegistry};
    pub use crate::reader::{
        DerbyReader, H2Reader, MetadataReader, MySqlReader, OracleReader, PostgresReader,
        SchemaReader, SqlServerReader, SqliteReader,
    };
}
