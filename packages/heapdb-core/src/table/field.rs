//! Field definition within a relation.

use std::sync::Arc;

use crate::types::Domain;

/// Named column bound to one domain.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name, unique within its relation
    name: String,
    /// Shared domain constraining the field's bytes
    domain: Arc<Domain>,
    /// Whether the field is part of the primary key
    is_key: bool,
}

impl Field {
    /// Creates a new field.
    ///
    /// # Arguments
    /// * `name` - Field name
    /// * `domain` - Domain shared with other fields
    /// * `is_key` - Whether the field belongs to the key
    pub fn new(name: impl Into<String>, domain: Arc<Domain>, is_key: bool) -> Self {
        Self {
            name: name.into(),
            domain,
            is_key,
        }
    }

    /// Creates a key field.
    pub fn key(name: impl Into<String>, domain: Arc<Domain>) -> Self {
        Self::new(name, domain, true)
    }

    /// Creates a non-key field.
    pub fn value(name: impl Into<String>, domain: Arc<Domain>) -> Self {
        Self::new(name, domain, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// Checks `value` against the field's domain.
    pub fn is_valid(&self, value: &[u8]) -> bool {
        self.domain.is_valid(value)
    }

    /// Returns the field size in bytes (its domain width).
    pub fn size(&self) -> usize {
        self.domain.size()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && *self.domain == *other.domain && self.is_key == other.is_key
    }
}

impl Eq for Field {}
