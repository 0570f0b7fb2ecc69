// SPDX-License-Identifier: MIT

//! `clankers query` — opens the database read-only and runs one ad hoc
//! `SELECT`/`WITH` statement against it.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clankers_core::PathResolver;
use clankers_store::Store;
use clap::Args;

use crate::output::{print_rows, OutputFormat};

#[derive(Args)]
pub struct QueryArgs {
    /// The SQL statement to run.
    pub sql: String,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn query(args: QueryArgs) -> Result<()> {
    let db_path = match args.db_path {
        Some(path) => path,
        None => PathResolver::new().db_path().context("resolving default database path")?,
    };
    if !db_path.exists() {
        return Err(anyhow!("no database found at {}", db_path.display()));
    }

    let store = Store::open_read_only(&db_path).with_context(|| format!("opening {}", db_path.display()))?;
    let rows = store.execute_query(&args.sql)?;
    print_rows(args.format, &rows)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
