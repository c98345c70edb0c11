//! Table persisted in a heap file.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DbConfig;
use crate::error::DbError;
use crate::storage::HeapFile;

use super::record::Record;
use super::relation::Relation;
use super::table::{apply_values, check_relation, Table};
use super::validation;

/// Table whose records live in a [`HeapFile`].
///
/// Records returned by [`Table::get_record`] are materialized into a read
/// cache and handed out by reference. The cache only grows unless
/// `read_cache_limit` is configured, in which case the oldest entries are
/// evicted first.
#[derive(Debug)]
pub struct PhysicalTable {
    /// Table name (also the file name)
    name: String,
    /// Shared schema
    relation: Arc<Relation>,
    /// Backing heap file
    file: HeapFile,
    /// Records materialized by reads
    cache: VecDeque<Record>,
    /// Maximum cached records (None = unbounded)
    cache_limit: Option<usize>,
    /// Sync file data after every write
    sync_on_write: bool,
}

impl PhysicalTable {
    /// Opens the heap file at `path` sized from `relation`.
    ///
    /// # Arguments
    /// * `name` - Table name
    /// * `relation` - Table schema
    /// * `path` - Heap file location
    /// * `config` - Cache and sync settings
    pub fn open(
        name: impl Into<String>,
        relation: Arc<Relation>,
        path: impl Into<PathBuf>,
        config: &DbConfig,
    ) -> Result<Self, DbError> {
        let file = HeapFile::open(path, relation.key_size(), relation.record_size())?;
        let mut table = Self::with_file(name, relation, file)?;
        table.cache_limit = config.read_cache_limit;
        table.sync_on_write = config.sync_on_write;
        Ok(table)
    }

    /// Wraps an already open heap file.
    ///
    /// # Errors
    /// `DbError::SchemaError` when the file's slot layout does not match
    /// the relation.
    pub fn with_file(
        name: impl Into<String>,
        relation: Arc<Relation>,
        file: HeapFile,
    ) -> Result<Self, DbError> {
        if file.key_size() != relation.key_size() || file.record_size() != relation.record_size()
        {
            return Err(DbError::SchemaError(format!(
                "heap file layout ({}/{}) does not match relation ({}/{})",
                file.key_size(),
                file.record_size(),
                relation.key_size(),
                relation.record_size()
            )));
        }
        Ok(Self {
            name: name.into(),
            relation,
            file,
            cache: VecDeque::new(),
            cache_limit: None,
            sync_on_write: false,
        })
    }

    /// Returns the backing heap file.
    pub fn file(&self) -> &HeapFile {
        &self.file
    }

    /// Number of records currently held by the read cache.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached record.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Flushes and truncates the heap file to its logical end.
    pub fn close(&mut self) -> Result<(), DbError> {
        self.cache.clear();
        self.file.close()
    }

    fn persist(&mut self, data: &[u8]) -> Result<(), DbError> {
        self.file.push(data)?;
        self.file.flush()?;
        if self.sync_on_write {
            self.file.sync()?;
        }
        Ok(())
    }

    fn key_not_found(&self) -> DbError {
        DbError::KeyNotFound {
            table: self.name.clone(),
        }
    }
}

impl Table for PhysicalTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn relation(&self) -> &Arc<Relation> {
        &self.relation
    }

    fn len(&self) -> usize {
        self.file.len()
    }

    fn add_record(&mut self, record: Record) -> Result<(), DbError> {
        check_relation(&self.relation, &record)?;
        if self.file.contains(record.key_data())? {
            return Err(DbError::DuplicateKey {
                table: self.name.clone(),
            });
        }
        self.persist(record.data())
    }

    fn get_record(&mut self, key: &[u8]) -> Result<Option<&Record>, DbError> {
        validation::validate_key_size(key, self.relation.key_size())?;
        let Some(raw) = self.file.get(key)? else {
            return Ok(None);
        };
        let record = Record::from_stored(self.relation.clone(), raw)?;

        if let Some(limit) = self.cache_limit {
            while self.cache.len() >= limit.max(1) {
                self.cache.pop_front();
            }
        }
        self.cache.push_back(record);
        Ok(self.cache.back())
    }

    fn delete_record(&mut self, key: &[u8]) -> Result<Record, DbError> {
        validation::validate_key_size(key, self.relation.key_size())?;
        match self.file.delete(key)? {
            Some(raw) => Record::from_stored(self.relation.clone(), raw),
            None => Err(self.key_not_found()),
        }
    }

    fn update_record_by_key(
        &mut self,
        key: &[u8],
        new_values: &[(&str, &[u8])],
    ) -> Result<(), DbError> {
        validation::validate_key_size(key, self.relation.key_size())?;
        let raw = self.file.get(key)?.ok_or_else(|| self.key_not_found())?;
        let mut record = Record::from_stored(self.relation.clone(), raw)?;
        apply_values(&mut record, new_values)?;

        if record.key_data() != key && self.file.contains(record.key_data())? {
            return Err(DbError::DuplicateKey {
                table: self.name.clone(),
            });
        }

        // Rewritten as delete + reinsert; the record moves to the last slot.
        self.file.delete(key)?;
        self.persist(record.data())
    }

    fn records(&mut self) -> Result<Vec<Record>, DbError> {
        let relation = self.relation.clone();
        self.file
            .scan()
            .map(|raw| Record::from_stored(relation.clone(), raw?))
            .collect()
    }
}
