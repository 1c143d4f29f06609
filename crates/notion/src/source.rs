use crate::client::Client;
use diagnostics::*;
use tabular::{PageSource, RecordPage};

/// Pages of one database, fetched through a [`Client`]
pub struct DatabaseSource<'a> {
    client: &'a Client,
    database_id: String,
}

impl<'a> DatabaseSource<'a> {
    pub fn new(client: &'a Client, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }
}

impl PageSource for DatabaseSource<'_> {
    fn query(&mut self, cursor: Option<&str>) -> tabular::Result<RecordPage> {
        let response = self
            .client
            .query_database(&self.database_id, cursor)
            .map_err(|e| tabular::Error::Source(format!("{e:#}")))?;

        let page = response.into_page();
        debug!(
            "Database {database_id} returned {count} records",
            database_id: self.database_id.as_str(),
            count: page.records.len()
        );
        Ok(page)
    }
}
