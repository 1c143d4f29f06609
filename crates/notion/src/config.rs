use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tabular::PageLimits;

/// Environment variable consulted when the config carries no token
pub const TOKEN_ENV: &str = "NOTION_TOKEN";

/// Connection settings and named databases
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotionConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_notion_version")]
    pub notion_version: String,
    /// Alias (e.g. "expenses") to database id
    pub databases: BTreeMap<String, String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Wall-clock ceiling for draining one database
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}
fn default_notion_version() -> String {
    "2022-06-28".to_string()
}
fn default_page_size() -> usize {
    100
}
fn default_max_pages() -> usize {
    1000
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl NotionConfig {
    /// A config with defaults for everything but the database map
    pub fn new(databases: BTreeMap<String, String>) -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            notion_version: default_notion_version(),
            databases,
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// The configured token, else `NOTION_TOKEN` from the environment
    pub fn token(&self) -> Result<String> {
        match &self.token {
            Some(token) if !token.is_empty() => Ok(token.clone()),
            _ => std::env::var(TOKEN_ENV)
                .with_context(|| format!("No token configured and {TOKEN_ENV} is not set")),
        }
    }

    pub fn database_id(&self, alias: &str) -> Result<&str> {
        self.databases
            .get(alias)
            .map(String::as_str)
            .with_context(|| format!("Unknown database alias: {alias}"))
    }

    pub fn limits(&self) -> PageLimits {
        PageLimits {
            max_pages: self.max_pages,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load configuration from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NotionConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let config: NotionConfig =
        serde_yaml_ng::from_str(&content).with_context(|| "Failed to parse YAML configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &NotionConfig) -> Result<()> {
    if config.databases.is_empty() {
        anyhow::bail!("At least one database must be configured");
    }

    for (alias, id) in &config.databases {
        if id.is_empty() {
            anyhow::bail!("Database id cannot be empty for alias {alias}");
        }
    }

    if !(1..=100).contains(&config.page_size) {
        anyhow::bail!("page_size must be between 1 and 100, got {}", config.page_size);
    }

    if config.max_pages == 0 {
        anyhow::bail!("max_pages must be greater than 0");
    }

    Ok(())
}
