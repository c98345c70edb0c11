//! Immutable table schema with a fixed byte layout.

use std::collections::{HashMap, HashSet};

use crate::error::DbError;

use super::field::Field;
use super::validation;

/// Table schema: key fields first, then non-key fields.
///
/// Field order fixes every byte offset for the lifetime of the relation.
/// A relation is never mutated after construction and is shared through
/// `Arc<Relation>` by every table and record built from it.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Fields in layout order (key fields, then the rest)
    fields: Vec<Field>,
    /// Number of leading key fields in `fields`
    key_count: usize,
    /// Byte offset of each field, parallel to `fields`
    offsets: Vec<usize>,
    /// Field name to index into `fields`
    index: HashMap<String, usize>,
    /// Total record size in bytes
    record_size: usize,
    /// Key size in bytes
    key_size: usize,
}

impl Relation {
    /// Builds a relation from an unordered list of fields.
    ///
    /// Key and non-key fields each keep their relative input order.
    ///
    /// # Errors
    /// `DbError::SchemaError` on a duplicate field name or when no field is
    /// marked as key.
    pub fn new(fields: Vec<Field>) -> Result<Self, DbError> {
        let mut seen_names = HashSet::new();
        for field in &fields {
            if !seen_names.insert(field.name()) {
                return Err(DbError::SchemaError(format!(
                    "duplicate field name '{}'",
                    field.name()
                )));
            }
        }

        let (key_fields, other_fields): (Vec<Field>, Vec<Field>) =
            fields.into_iter().partition(|f| f.is_key());
        if key_fields.is_empty() {
            return Err(DbError::SchemaError(
                "relation must have at least one key field".to_string(),
            ));
        }

        let key_count = key_fields.len();
        let fields: Vec<Field> = key_fields.into_iter().chain(other_fields).collect();

        let mut offsets = Vec::with_capacity(fields.len());
        let mut index = HashMap::with_capacity(fields.len());
        let mut record_size = 0;
        let mut key_size = 0;
        for (i, field) in fields.iter().enumerate() {
            offsets.push(record_size);
            index.insert(field.name().to_string(), i);
            record_size += field.size();
            if i < key_count {
                key_size += field.size();
            }
        }

        Ok(Self {
            fields,
            key_count,
            offsets,
            index,
            record_size,
            key_size,
        })
    }

    /// Returns all fields in layout order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the key fields in layout order.
    pub fn key_fields(&self) -> &[Field] {
        &self.fields[..self.key_count]
    }

    /// Returns the non-key fields in layout order.
    pub fn non_key_fields(&self) -> &[Field] {
        &self.fields[self.key_count..]
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns the byte offset where `name` starts inside a record.
    pub fn start_point_of(&self, name: &str) -> Result<usize, DbError> {
        self.index
            .get(name)
            .map(|&i| self.offsets[i])
            .ok_or_else(|| DbError::FieldNotFound {
                field: name.to_string(),
            })
    }

    /// Returns the byte range `name` occupies inside a record.
    pub fn field_range(&self, name: &str) -> Result<std::ops::Range<usize>, DbError> {
        let i = *self.index.get(name).ok_or_else(|| DbError::FieldNotFound {
            field: name.to_string(),
        })?;
        let start = self.offsets[i];
        Ok(start..start + self.fields[i].size())
    }

    /// Iterates over `(field, byte range)` pairs in layout order.
    pub fn layout(&self) -> impl Iterator<Item = (&Field, std::ops::Range<usize>)> {
        self.fields
            .iter()
            .zip(self.offsets.iter())
            .map(|(f, &start)| (f, start..start + f.size()))
    }

    /// Checks that `data` has the record size and every field slice passes
    /// its domain.
    pub fn is_valid(&self, data: &[u8]) -> bool {
        self.check(data).is_ok()
    }

    /// Like [`Relation::is_valid`], reporting the first failure.
    pub(crate) fn check(&self, data: &[u8]) -> Result<(), DbError> {
        validation::validate_record_size(data, self.record_size)?;
        for (field, range) in self.layout() {
            if !field.is_valid(&data[range]) {
                return Err(DbError::ValidationError(format!(
                    "value of field '{}' is not valid for domain {}",
                    field.name(),
                    field.domain()
                )));
            }
        }
        Ok(())
    }

    /// Encodes one value per field, in layout order, into record bytes.
    ///
    /// Each value goes through its field's domain encoding, so strings and
    /// enum members may be shorter than the field width.
    pub fn encode_values(&self, values: &[&[u8]]) -> Result<Vec<u8>, DbError> {
        if values.len() != self.fields.len() {
            return Err(DbError::ValidationError(format!(
                "expected {} values, got {}",
                self.fields.len(),
                values.len()
            )));
        }
        let mut data = Vec::with_capacity(self.record_size);
        for (field, value) in self.fields.iter().zip(values) {
            let slot = field.domain().encode(value).map_err(|_| {
                DbError::ValidationError(format!(
                    "value of field '{}' is not valid for domain {}",
                    field.name(),
                    field.domain()
                ))
            })?;
            data.extend_from_slice(&slot);
        }
        Ok(data)
    }

    /// Encodes a value for a single field, padding it to the field width.
    pub fn encode_field(&self, name: &str, value: &[u8]) -> Result<Vec<u8>, DbError> {
        let field = self.field(name).ok_or_else(|| DbError::FieldNotFound {
            field: name.to_string(),
        })?;
        field.domain().encode(value)
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.key_count == other.key_count && self.fields == other.fields
    }
}

impl Eq for Relation {}
