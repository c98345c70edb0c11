//! Schema description used to re-attach tables on open.
//!
//! Heap files carry no header, so record and key sizes must be rebuilt
//! from the schema every time a database is opened.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::storage::classify_io_error;
use crate::table::{Field, Relation};
use crate::types::Domain;

/// Schema file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Table definitions
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

/// Table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Field definitions, key flags mark the primary key
    pub fields: Vec<FieldSchema>,
}

/// Field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name
    pub name: String,
    /// Field domain
    pub domain: Domain,
    /// Whether the field is part of the key
    #[serde(default)]
    pub key: bool,
}

impl SchemaFile {
    /// Parses a schema from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, DbError> {
        serde_json::from_str(contents)
            .map_err(|e| DbError::SerializationError(format!("Failed to parse schema: {}", e)))
    }

    /// Reads and parses a schema file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| classify_io_error(e, &format!("Failed to read {}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Serializes the schema as pretty JSON.
    pub fn to_json(&self) -> Result<String, DbError> {
        serde_json::to_string_pretty(self).map_err(|e| DbError::SerializationError(e.to_string()))
    }
}

impl TableSchema {
    /// Builds the relation, resolving each domain through `intern`.
    pub fn build_relation<F>(&self, mut intern: F) -> Result<Relation, DbError>
    where
        F: FnMut(Domain) -> Arc<Domain>,
    {
        let fields = self
            .fields
            .iter()
            .map(|f| Field::new(f.name.clone(), intern(f.domain.clone()), f.key))
            .collect();
        Relation::new(fields)
    }
}
