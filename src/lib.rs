//! Betterplace-Scraper: an incremental crawler for fundraising projects
//!
//! This crate implements the crawl/merge/persist pipeline for the betterplace
//! projects API: paginated retrieval with retry, per-record category tag
//! resolution, normalization into a wide snapshot row, and append-only
//! persistence into SQLite.

pub mod config;
pub mod crawler;
pub mod model;
pub mod report;
pub mod storage;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Failed to decode page body from {url}: {source}")]
    PageDecode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Persistence error: {0}")]
    Persist(#[from] storage::PersistError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{scrape_and_store, RunSummary};
pub use model::{CrawlMode, ProjectSnapshot, RunContext};
