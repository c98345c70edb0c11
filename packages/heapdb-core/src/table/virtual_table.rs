//! Table held only in memory.

use std::sync::Arc;

use crate::error::DbError;

use super::record::Record;
use super::relation::Relation;
use super::table::{apply_values, check_relation, Table};
use super::validation;

/// In-memory table keeping records in insertion order.
#[derive(Debug, Clone)]
pub struct VirtualTable {
    name: String,
    relation: Arc<Relation>,
    records: Vec<Record>,
}

impl VirtualTable {
    /// Creates an empty virtual table.
    pub fn new(relation: Arc<Relation>) -> Self {
        Self::with_name("virtual", relation)
    }

    pub fn with_name(name: impl Into<String>, relation: Arc<Relation>) -> Self {
        Self {
            name: name.into(),
            relation,
            records: Vec::new(),
        }
    }

    /// Builds a virtual table from existing records, enforcing key uniqueness.
    pub fn from_records(
        name: impl Into<String>,
        relation: Arc<Relation>,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, DbError> {
        let mut table = Self::with_name(name, relation);
        for record in records {
            table.add_record(record)?;
        }
        Ok(table)
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    fn position(&self, key: &[u8]) -> Result<Option<usize>, DbError> {
        validation::validate_key_size(key, self.relation.key_size())?;
        Ok(self.records.iter().position(|r| r.key_data() == key))
    }

    fn key_not_found(&self) -> DbError {
        DbError::KeyNotFound {
            table: self.name.clone(),
        }
    }
}

impl Table for VirtualTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn relation(&self) -> &Arc<Relation> {
        &self.relation
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn add_record(&mut self, record: Record) -> Result<(), DbError> {
        check_relation(&self.relation, &record)?;
        if self.position(record.key_data())?.is_some() {
            return Err(DbError::DuplicateKey {
                table: self.name.clone(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    fn get_record(&mut self, key: &[u8]) -> Result<Option<&Record>, DbError> {
        Ok(self.position(key)?.map(|i| &self.records[i]))
    }

    fn delete_record(&mut self, key: &[u8]) -> Result<Record, DbError> {
        match self.position(key)? {
            Some(i) => Ok(self.records.remove(i)),
            None => Err(self.key_not_found()),
        }
    }

    fn update_record_by_key(
        &mut self,
        key: &[u8],
        new_values: &[(&str, &[u8])],
    ) -> Result<(), DbError> {
        let i = self.position(key)?.ok_or_else(|| self.key_not_found())?;
        let mut updated = self.records[i].clone();
        apply_values(&mut updated, new_values)?;

        let moved_onto_other = updated.key_data() != key
            && self
                .records
                .iter()
                .any(|r| r.key_data() == updated.key_data());
        if moved_onto_other {
            return Err(DbError::DuplicateKey {
                table: self.name.clone(),
            });
        }

        self.records[i] = updated;
        Ok(())
    }

    fn records(&mut self) -> Result<Vec<Record>, DbError> {
        Ok(self.records.clone())
    }
}

impl<'a> IntoIterator for &'a VirtualTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
