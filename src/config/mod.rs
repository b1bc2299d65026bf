//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files for the scraper.
//!
//! # Example
//!
//! ```no_run
//! use betterplace_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("API base: {}", config.api.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, CrawlConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
