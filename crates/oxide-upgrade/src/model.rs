//! Declared model files.
//!
//! A model is a JSON document listing tables and sequences:
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "users",
//!       "columns": [
//!         { "name": "id", "type_code": "BIGINT", "primary_key": true },
//!         { "name": "email", "type_code": "VARCHAR", "length": 100, "unique": true }
//!       ]
//!     }
//!   ],
//!   "sequences": [{ "name": "seq_orders", "start": 1 }]
//! }
//! ```
//!
//! Objects qualified with a `catalog` or `schema` are upgraded in that
//! schema, the rest in the connection's default schema.

use std::path::Path;

use oxide_db::{Schema, Sequence, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// The content of a model file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Declared tables.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Declared sequences.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl Model {
    /// Parses a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a model file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a serialization
    /// error if it is not a valid model.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading model");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Splits the model into one declared schema per qualifier. The
    /// default schema is left out when it is empty and others exist.
    #[must_use]
    pub fn into_schemas(self) -> Vec<Schema> {
        let mut schemas = Schema::partition(self.tables, self.sequences);
        if schemas.len() > 1 && schemas[0].tables.is_empty() && schemas[0].sequences.is_empty() {
            schemas.remove(0);
        }
        schemas
    }
}
