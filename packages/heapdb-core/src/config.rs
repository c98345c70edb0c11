//! Database configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::storage::classify_io_error;

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Database name
    pub name: String,
    /// Directory holding one heap file per table
    pub data_dir: PathBuf,
    /// Call `sync_data` after every successful write
    pub sync_on_write: bool,
    /// Maximum materialized records kept per physical table (None = unbounded)
    pub read_cache_limit: Option<usize>,
    /// Width of the built-in string domain
    pub default_string_len: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            name: "heapdb".to_string(),
            data_dir: PathBuf::from("./data"),
            sync_on_write: false,
            read_cache_limit: None,
            default_string_len: 25,
        }
    }
}

impl DbConfig {
    /// Loads a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| classify_io_error(e, &format!("Failed to read {}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| DbError::SerializationError(format!("Failed to parse config: {}", e)))
    }
}
