//! Database error types.

use thiserror::Error;

/// Database operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Relation definition is malformed (no key field, duplicate field name)
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Bytes fail a field's domain check or have the wrong total length
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Field value width does not match the field size
    #[error("Field '{field}' expects {expected} bytes, got {got}")]
    LengthMismatch {
        field: String,
        expected: usize,
        got: usize,
    },

    /// Key width does not match the relation's key size
    #[error("Key must be {expected} bytes, got {got}")]
    KeySizeMismatch { expected: usize, got: usize },

    /// Insert collides with an existing key
    #[error("Duplicate key in table '{table}'")]
    DuplicateKey { table: String },

    /// Delete or update on an absent key
    #[error("Key not found in table '{table}'")]
    KeyNotFound { table: String },

    /// Pushed bytes are not a positive multiple of the record size
    #[error("Data length {len} is not a positive multiple of record size {record_size}")]
    SizeMismatch { len: usize, record_size: usize },

    /// Table already exists
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Field not found in relation
    #[error("Field '{field}' not found")]
    FieldNotFound { field: String },

    /// Statement text could not be classified
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Disk full error
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during open, read, write or truncate
    #[error("I/O error: {0}")]
    IoError(String),
}

impl DbError {
    /// Returns true for errors raised while building a relation.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, DbError::SchemaError(_))
    }

    /// Returns true for errors caused by the storage layer.
    pub fn is_io_error(&self) -> bool {
        matches!(self, DbError::IoError(_) | DbError::DiskFull(_))
    }
}
