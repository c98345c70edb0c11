//! Executes classified statements against a database.

use crate::database::Database;
use crate::error::DbError;
use crate::table::{Table, VirtualTable};

use super::{parse, StatementKind};

/// Result of one executed statement.
#[derive(Debug)]
pub enum ExecuteOutcome {
    /// Full scan of the table named after `FROM`
    Rows(VirtualTable),
    /// Select without a source table
    NoSource,
    /// Statement kind with no execution path
    Unsupported(StatementKind),
}

/// Executes statement text against a database.
#[derive(Debug)]
pub struct Interpreter {
    db: Database,
}

impl Interpreter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    /// Parses `text` and runs each statement in order.
    ///
    /// Execution stops at the first failing statement.
    pub fn execute(&mut self, text: &str) -> Result<Vec<ExecuteOutcome>, DbError> {
        let statements = parse(text)?;
        let mut outcomes = Vec::with_capacity(statements.len());
        for statement in statements {
            let outcome = match (statement.kind, statement.from_table) {
                (StatementKind::Select, Some(table)) => ExecuteOutcome::Rows(self.scan(&table)?),
                (StatementKind::Select, None) => ExecuteOutcome::NoSource,
                (kind, _) => {
                    tracing::debug!("Unsupported statement kind {}", kind);
                    ExecuteOutcome::Unsupported(kind)
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn scan(&mut self, name: &str) -> Result<VirtualTable, DbError> {
        let table = self.db.get_table_mut(name)?;
        let records = table.records()?;
        tracing::debug!("Scanned {} records from '{}'", records.len(), name);
        VirtualTable::from_records(name, table.relation().clone(), records)
    }
}
