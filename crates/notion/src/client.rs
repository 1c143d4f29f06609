use crate::config::NotionConfig;
use crate::models::{ApiError, DatabaseSchema, QueryBody, QueryResponse};
use anyhow::{Context, Result, anyhow};
use diagnostics::*;
use reqwest::blocking::{RequestBuilder, Response};
use tabular::SelectOption;

const VERSION_HEADER: &str = "Notion-Version";

/// Blocking Notion API client
pub struct Client {
    http_client: reqwest::blocking::Client,
    token: String,
    base_url: String,
    notion_version: String,
    page_size: usize,
}

impl Client {
    /// Create a client from the connection part of `config`
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Client {
            http_client,
            token: config.token()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            notion_version: config.notion_version.clone(),
            page_size: config.page_size,
        })
    }

    /// Fetch one page of a database query
    pub fn query_database(&self, database_id: &str, cursor: Option<&str>) -> Result<QueryResponse> {
        let url = self.query_url(database_id);
        let body = QueryBody {
            start_cursor: cursor,
            page_size: self.page_size,
        };
        debug!("Querying {url} from {from}", url: url.as_str(), from: cursor.unwrap_or("start"));
        self.fetch_json(&url, self.http_client.post(&url).json(&body))
    }

    /// Fetch the property declarations of a database
    pub fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        let url = self.database_url(database_id);
        self.fetch_json(&url, self.http_client.get(&url))
    }

    /// Allowed values of a select or multi-select property
    pub fn property_options(
        &self,
        database_id: &str,
        property: &str,
    ) -> Result<Option<Vec<SelectOption>>> {
        let schema = self.retrieve_database(database_id)?;
        let options = schema.options(property);
        if options.is_none() {
            debug!(
                "Property {property} has no options in database {database_id}",
                property: property,
                database_id: database_id
            );
        }
        Ok(options)
    }

    fn fetch_json<T>(&self, url: &str, request: RequestBuilder) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = request
            .bearer_auth(&self.token)
            .header(VERSION_HEADER, &self.notion_version)
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;

        let response = check_status(url, response)?;

        let json_text = response
            .text()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        serde_json::from_str(&json_text)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    fn database_url(&self, database_id: &str) -> String {
        format!("{}/databases/{}", self.base_url, database_id)
    }

    fn query_url(&self, database_id: &str) -> String {
        format!("{}/databases/{}/query", self.base_url, database_id)
    }
}

fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    let detail = serde_json::from_str::<ApiError>(&error_text)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or(error_text);
    warn!(
        "Request to {url} failed with status {status_code}",
        url: url,
        status_code: status.as_u16()
    );
    Err(anyhow!("HTTP {} error from {}: {}", status, url, detail))
}
