//! Notion databases as paginated record sources
//!
//! A [`Client`] talks to the Notion REST API; [`DatabaseSource`] adapts one
//! database to [`tabular::PageSource`] so it can be drained into a
//! [`tabular::Table`].

pub mod client;
pub mod config;
pub mod models;
pub mod source;

pub use crate::client::Client;
pub use crate::config::{NotionConfig, load_config, validate_config};
pub use crate::models::{DatabaseSchema, PropertySchema, QueryResponse};
pub use crate::source::DatabaseSource;

use anyhow::{Context, Result};
use diagnostics::*;
use tabular::{SelectOption, Table};

/// Fetch every record of the database named `alias` into a table.
pub fn fetch_table(config: &NotionConfig, alias: &str) -> Result<Table> {
    let database_id = config.database_id(alias)?;
    let client = Client::new(config)?;
    let source = DatabaseSource::new(&client, database_id);

    let table = tabular::fetch_table(source, config.limits())
        .with_context(|| format!("Failed to fetch database {alias}"))?;

    info!("Fetched {rows} rows from {alias}", rows: table.len(), alias: alias);
    Ok(table)
}

/// Options of a select or multi-select property of the database named `alias`.
pub fn property_options(
    config: &NotionConfig,
    alias: &str,
    property: &str,
) -> Result<Option<Vec<SelectOption>>> {
    let database_id = config.database_id(alias)?;
    Client::new(config)?.property_options(database_id, property)
}
