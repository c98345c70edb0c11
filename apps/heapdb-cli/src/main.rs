//! Interactive statement prompt for heapdb.
//!
//! Opens a database, attaches tables from an optional schema file and
//! reads statements line by line until `exit`, `quit` or end of input.

mod repl;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use heapdb_core::schema::SchemaFile;
use heapdb_core::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

use crate::repl::Repl;

/// Command-line arguments for the prompt.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the table files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Database name
    #[arg(long)]
    name: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON schema describing the tables to attach
    #[arg(long)]
    schema: Option<PathBuf>,
}

impl Args {
    fn db_config(&self) -> anyhow::Result<DbConfig> {
        let mut config = match &self.config {
            Some(path) => DbConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DbConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = args.db_config()?;
    let mut db = Database::open(config).context("failed to open database")?;

    if let Some(path) = &args.schema {
        let schema = SchemaFile::from_json_file(path)
            .with_context(|| format!("failed to load schema {}", path.display()))?;
        db.attach_schema(&schema)
            .context("failed to attach schema")?;
    }

    let mut repl = Repl::new(db)?;
    repl.run();

    if let Err(e) = repl.into_database().close() {
        tracing::error!("Failed to close database: {}", e);
        return Err(e).context("failed to close database");
    }
    Ok(())
}
