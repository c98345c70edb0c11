//! Core storage engine for a schema-driven fixed-width record store.
//!
//! Provides domains, relations and records, heap-file persistence,
//! physical and virtual tables, a database catalog and a thin statement
//! interpreter.

pub mod config;
pub mod database;
pub mod error;
pub mod schema;
pub mod sql;
pub mod storage;
pub mod table;
pub mod types;

pub use config::DbConfig;
pub use database::Database;
pub use error::DbError;
