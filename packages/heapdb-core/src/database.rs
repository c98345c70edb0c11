//! Database catalog managing domains and tables.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DbConfig;
use crate::error::DbError;
use crate::schema::SchemaFile;
use crate::storage::classify_io_error;
use crate::table::{validation, PhysicalTable, Relation, Table};
use crate::types::Domain;

/// Database catalog holding domains and physical tables.
///
/// Each table is stored in its own heap file at `<data_dir>/<table name>`.
#[derive(Debug)]
pub struct Database {
    /// Database name
    name: String,
    /// Directory holding the heap files
    data_dir: PathBuf,
    /// Registered domains
    domains: Vec<Arc<Domain>>,
    /// Map of table name to table instance
    tables: HashMap<String, PhysicalTable>,
    /// Settings applied to every table
    config: DbConfig,
}

impl Database {
    /// Opens a database, creating its data directory if absent.
    ///
    /// The integer domain and a string domain of `default_string_len`
    /// bytes are registered up front.
    pub fn open(config: DbConfig) -> Result<Self, DbError> {
        fs::create_dir_all(&config.data_dir).map_err(|e| {
            classify_io_error(
                e,
                &format!("Failed to create data directory {}", config.data_dir.display()),
            )
        })?;

        tracing::debug!(
            "Opened database '{}' at {}",
            config.name,
            config.data_dir.display()
        );

        Ok(Self {
            name: config.name.clone(),
            data_dir: config.data_dir.clone(),
            domains: vec![
                Arc::new(Domain::Integer),
                Arc::new(Domain::String {
                    max_len: config.default_string_len,
                }),
            ],
            tables: HashMap::new(),
            config,
        })
    }

    /// Opens a database in `data_dir` with default settings.
    pub fn open_dir(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        Self::open(DbConfig {
            name: name.into(),
            data_dir: data_dir.into(),
            ..Default::default()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Registers a domain, returning the shared instance.
    ///
    /// A domain equal to an already registered one is not added twice;
    /// the existing instance is returned instead.
    pub fn add_domain(&mut self, domain: Domain) -> Arc<Domain> {
        if let Some(existing) = self.domains.iter().find(|d| ***d == domain) {
            return existing.clone();
        }
        let domain = Arc::new(domain);
        self.domains.push(domain.clone());
        domain
    }

    /// Returns every registered domain.
    pub fn domains(&self) -> &[Arc<Domain>] {
        &self.domains
    }

    /// Creates a physical table backed by `<data_dir>/<name>`.
    ///
    /// An existing file at that path is reopened and its records kept.
    ///
    /// # Errors
    /// `DbError::TableAlreadyExists` when the name is taken,
    /// `DbError::ValidationError` when the name is not a plain file name.
    pub fn add_table(
        &mut self,
        name: &str,
        relation: Arc<Relation>,
    ) -> Result<&mut PhysicalTable, DbError> {
        if self.tables.contains_key(name) {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }
        validation::validate_table_name(name)?;

        let path = self.data_dir.join(name);
        let table = PhysicalTable::open(name, relation, path, &self.config)?;
        tracing::debug!("Added table '{}' with {} records", name, table.len());

        Ok(self.tables.entry(name.to_string()).or_insert(table))
    }

    /// Gets a table by name.
    pub fn get_table(&self, name: &str) -> Result<&PhysicalTable, DbError> {
        self.tables.get(name).ok_or_else(|| DbError::TableNotFound {
            table: name.to_string(),
        })
    }

    /// Gets a mutable table by name.
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut PhysicalTable, DbError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Removes a table from the catalog and closes its heap file.
    ///
    /// The file stays on disk, truncated to its live records.
    pub fn delete_table(&mut self, name: &str) -> Result<(), DbError> {
        let mut table = self
            .tables
            .remove(name)
            .ok_or_else(|| DbError::TableNotFound {
                table: name.to_string(),
            })?;
        tracing::debug!("Deleted table '{}'", name);
        table.close()
    }

    /// Returns all table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of tables in the database.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Adds every table described by `schema`, interning its domains.
    pub fn attach_schema(&mut self, schema: &SchemaFile) -> Result<(), DbError> {
        for table in &schema.tables {
            let relation = table.build_relation(|d| self.add_domain(d))?;
            self.add_table(&table.name, Arc::new(relation))?;
        }
        Ok(())
    }

    /// Closes every table, truncating each heap file to its live records.
    ///
    /// All tables are closed even when one fails; the first failure is returned.
    pub fn close(mut self) -> Result<(), DbError> {
        let mut first_error = None;
        for (name, mut table) in self.tables.drain() {
            if let Err(e) = table.close() {
                tracing::error!("Failed to close table '{}': {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
