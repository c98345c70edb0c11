//! Validation helpers shared by records, tables and the catalog.

use std::path::{Component, Path};

use crate::error::DbError;

use super::field::Field;

/// Validates that a key has exactly the relation's key size.
///
/// # Arguments
/// * `key` - Raw key bytes
/// * `key_size` - Expected key size in bytes
pub(crate) fn validate_key_size(key: &[u8], key_size: usize) -> Result<(), DbError> {
    if key.len() != key_size {
        return Err(DbError::KeySizeMismatch {
            expected: key_size,
            got: key.len(),
        });
    }
    Ok(())
}

/// Validates that raw record bytes have exactly the relation's record size.
pub(crate) fn validate_record_size(data: &[u8], record_size: usize) -> Result<(), DbError> {
    if data.len() != record_size {
        return Err(DbError::ValidationError(format!(
            "record must be {} bytes, got {}",
            record_size,
            data.len()
        )));
    }
    Ok(())
}

/// Validates that a replacement value has exactly the field's width.
pub(crate) fn validate_field_width(field: &Field, value: &[u8]) -> Result<(), DbError> {
    if value.len() != field.size() {
        return Err(DbError::LengthMismatch {
            field: field.name().to_string(),
            expected: field.size(),
            got: value.len(),
        });
    }
    Ok(())
}

/// Validates that a table name maps to exactly one file inside the data directory.
pub(crate) fn validate_table_name(name: &str) -> Result<(), DbError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(DbError::ValidationError(format!(
            "invalid table name '{}'",
            name
        ))),
    }
}
