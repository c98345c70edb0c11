//! Schema-validated fixed-width record.

use std::sync::Arc;

use crate::error::DbError;

use super::field::Field;
use super::relation::Relation;
use super::validation;

/// One row: a byte payload of exactly `relation.record_size()` bytes.
///
/// Layout: key fields in schema order, then non-key fields in schema
/// order, no padding between them. `data[..key_size]` is the key.
#[derive(Debug, Clone)]
pub struct Record {
    relation: Arc<Relation>,
    data: Box<[u8]>,
}

impl Record {
    /// Builds a record, validating `data` against the relation.
    ///
    /// # Errors
    /// `DbError::ValidationError` when the length differs from the record
    /// size or a field slice fails its domain check.
    pub fn new(relation: Arc<Relation>, data: impl Into<Vec<u8>>) -> Result<Self, DbError> {
        let data = data.into();
        relation.check(&data)?;
        Ok(Self {
            relation,
            data: data.into_boxed_slice(),
        })
    }

    /// Wraps bytes read back from storage without re-running domain checks.
    ///
    /// Field updates skip domain validation, so stored slots may hold
    /// values their domain rejects. Only the length is checked.
    pub(crate) fn from_stored(relation: Arc<Relation>, data: Vec<u8>) -> Result<Self, DbError> {
        validation::validate_record_size(&data, relation.record_size())?;
        Ok(Self {
            relation,
            data: data.into_boxed_slice(),
        })
    }

    /// Builds a record from one value per field in layout order, padding
    /// each value through its domain.
    pub fn from_values(relation: Arc<Relation>, values: &[&[u8]]) -> Result<Self, DbError> {
        let data = relation.encode_values(values)?;
        Self::new(relation, data)
    }

    pub fn relation(&self) -> &Arc<Relation> {
        &self.relation
    }

    /// Returns the raw record bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_vec()
    }

    /// Returns the leading key bytes.
    pub fn key_data(&self) -> &[u8] {
        &self.data[..self.relation.key_size()]
    }

    /// Returns the bytes of field `name`.
    pub fn value_at(&self, name: &str) -> Result<&[u8], DbError> {
        let range = self.relation.field_range(name)?;
        Ok(&self.data[range])
    }

    /// Returns each key field with its bytes.
    pub fn key(&self) -> Vec<(&Field, &[u8])> {
        self.relation
            .layout()
            .take(self.relation.key_fields().len())
            .map(|(field, range)| (field, &self.data[range]))
            .collect()
    }

    /// Returns true when every `(field, value)` pair matches this record.
    ///
    /// Unknown field names never match.
    pub fn values_inside(&self, values: &[(&str, &[u8])]) -> bool {
        values
            .iter()
            .all(|(name, value)| matches!(self.value_at(name), Ok(v) if v == *value))
    }

    /// Re-checks every field against its domain.
    pub fn is_valid(&self) -> bool {
        self.relation.is_valid(&self.data)
    }

    /// Overwrites field `name` in place.
    ///
    /// The new bytes are not re-checked against the field's domain.
    ///
    /// # Errors
    /// `DbError::FieldNotFound` for an unknown field,
    /// `DbError::LengthMismatch` when `value` is not exactly the field size.
    pub fn set_value(&mut self, name: &str, value: &[u8]) -> Result<(), DbError> {
        let field = self
            .relation
            .field(name)
            .ok_or_else(|| DbError::FieldNotFound {
                field: name.to_string(),
            })?;
        validation::validate_field_width(field, value)?;
        let range = self.relation.field_range(name)?;
        self.data[range].copy_from_slice(value);
        Ok(())
    }

    /// Renders every field for display, in layout order.
    pub fn render(&self) -> Vec<(String, String)> {
        self.relation
            .layout()
            .map(|(field, range)| {
                (
                    field.name().to_string(),
                    field.domain().render(&self.data[range]),
                )
            })
            .collect()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && *self.relation == *other.relation
    }
}

impl Eq for Record {}
