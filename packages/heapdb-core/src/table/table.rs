//! Record storage interface shared by physical and virtual tables.

use std::sync::Arc;

use crate::error::DbError;

use super::record::Record;
use super::relation::Relation;

/// A keyed collection of records sharing one relation.
///
/// Every implementation enforces primary-key uniqueness on insert. Lookups
/// compare raw key bytes (`Record::key_data`).
pub trait Table {
    /// Table name used in error messages.
    fn name(&self) -> &str;

    /// Schema of every record in the table.
    fn relation(&self) -> &Arc<Relation>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a record.
    ///
    /// # Errors
    /// `DbError::SchemaError` when the record was built for another
    /// relation, `DbError::DuplicateKey` when its key is already stored.
    fn add_record(&mut self, record: Record) -> Result<(), DbError>;

    /// Validates raw bytes against the relation and inserts them.
    fn add_raw(&mut self, data: &[u8]) -> Result<(), DbError> {
        let record = Record::new(self.relation().clone(), data)?;
        self.add_record(record)
    }

    /// Looks up the record with `key`.
    fn get_record(&mut self, key: &[u8]) -> Result<Option<&Record>, DbError>;

    /// Removes and returns the record with `key`.
    ///
    /// # Errors
    /// `DbError::KeyNotFound` when no record has `key`.
    fn delete_record(&mut self, key: &[u8]) -> Result<Record, DbError>;

    /// Overwrites fields of the record with `key`.
    ///
    /// Each value must be exactly its field's width. The new values are
    /// not checked against the field domains.
    ///
    /// # Errors
    /// `DbError::KeyNotFound` when no record has `key`; `DbError::DuplicateKey`
    /// when the update moves the record onto another stored key.
    fn update_record_by_key(
        &mut self,
        key: &[u8],
        new_values: &[(&str, &[u8])],
    ) -> Result<(), DbError>;

    /// Materializes every stored record in storage order.
    fn records(&mut self) -> Result<Vec<Record>, DbError>;

    /// Returns the records whose fields equal all of `values`.
    fn search(&mut self, values: &[(&str, &[u8])]) -> Result<Vec<Record>, DbError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.values_inside(values))
            .collect())
    }
}

/// Rejects records built for a different relation.
pub(crate) fn check_relation(relation: &Arc<Relation>, record: &Record) -> Result<(), DbError> {
    if Arc::ptr_eq(relation, record.relation()) || **relation == **record.relation() {
        Ok(())
    } else {
        Err(DbError::SchemaError(
            "record does not belong to the table's relation".to_string(),
        ))
    }
}

/// Applies field overwrites to `record`.
pub(crate) fn apply_values(record: &mut Record, new_values: &[(&str, &[u8])]) -> Result<(), DbError> {
    for (name, value) in new_values {
        record.set_value(name, value)?;
    }
    Ok(())
}
