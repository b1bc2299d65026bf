use crate::model::CrawlMode;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

impl Config {
    /// The target table for a given crawl mode
    pub fn table_for(&self, mode: CrawlMode) -> &str {
        match mode {
            CrawlMode::Exhaustive => &self.output.full_table,
            CrawlMode::Incremental => &self.output.incremental_table,
        }
    }
}

/// Remote API connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the projects API (e.g. "https://api.betterplace.org/de/api_v4")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Records per listing page
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request before giving up on the network
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Sleep between retry attempts in seconds
    #[serde(rename = "retry-delay-secs", default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Recency window for the incremental stopping rule, in days
    #[serde(rename = "recency-window-days", default = "default_recency_window")]
    pub recency_window_days: i64,

    /// Optional hard ceiling on pages fetched per run; unset means no ceiling
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            recency_window_days: default_recency_window(),
            max_pages: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Table receiving exhaustive (full rescan) runs
    #[serde(rename = "full-table", default = "default_full_table")]
    pub full_table: String,

    /// Table receiving incremental update runs
    #[serde(rename = "incremental-table", default = "default_incremental_table")]
    pub incremental_table: String,
}

fn default_per_page() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    60
}

fn default_recency_window() -> i64 {
    7
}

fn default_full_table() -> String {
    "projects_vf".to_string()
}

fn default_incremental_table() -> String {
    "projects_vf_backup".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
[api]
base-url = "https://api.betterplace.org/de/api_v4"

[output]
database-path = "./betterplace.db"
"#,
        )
        .unwrap();

        assert_eq!(config.api.per_page, 50);
        assert_eq!(config.api.retry_attempts, 5);
        assert_eq!(config.api.retry_delay_secs, 60);
        assert_eq!(config.crawl.recency_window_days, 7);
        assert_eq!(config.crawl.max_pages, None);
        assert_eq!(config.output.full_table, "projects_vf");
        assert_eq!(config.output.incremental_table, "projects_vf_backup");
    }

    #[test]
    fn test_table_for_mode() {
        let config: Config = toml::from_str(
            r#"
[api]
base-url = "https://api.betterplace.org/de/api_v4"

[output]
database-path = "./betterplace.db"
full-table = "projects_full"
incremental-table = "projects_update"
"#,
        )
        .unwrap();

        assert_eq!(config.table_for(CrawlMode::Exhaustive), "projects_full");
        assert_eq!(config.table_for(CrawlMode::Incremental), "projects_update");
    }
}
