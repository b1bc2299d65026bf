//! Configuration validation
//!
//! Catches configuration mistakes before a run starts: malformed base URLs,
//! out-of-range crawl knobs, and table names that cannot be interpolated
//! into SQL safely.

use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_base_url(&config.api.base_url)?;

    if config.api.per_page == 0 || config.api.per_page > 200 {
        return Err(ConfigError::Validation(format!(
            "per-page must be between 1 and 200, got {}",
            config.api.per_page
        )));
    }

    if config.api.retry_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry-attempts must be at least 1".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.crawl.recency_window_days < 1 {
        return Err(ConfigError::Validation(format!(
            "recency-window-days must be at least 1, got {}",
            config.crawl.recency_window_days
        )));
    }

    if let Some(max_pages) = config.crawl.max_pages {
        if max_pages == 0 {
            return Err(ConfigError::Validation(
                "max-pages must be at least 1 when set".to_string(),
            ));
        }
    }

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    validate_table_name(&config.output.full_table)?;
    validate_table_name(&config.output.incremental_table)?;

    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed =
        Url::parse(base_url).map_err(|_| ConfigError::InvalidUrl(base_url.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidUrl(base_url.to_string())),
    }
}

/// Table names end up interpolated into SQL statements, so only identifier
/// characters are accepted.
fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().unwrap_or('0').is_ascii_digit();

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "invalid table name: {name:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ApiConfig, CrawlConfig, OutputConfig};

    fn valid_config() -> Config {
        Config {
            api: ApiConfig {
                base_url: "https://api.betterplace.org/de/api_v4".to_string(),
                per_page: 50,
                timeout_secs: 30,
                retry_attempts: 5,
                retry_delay_secs: 60,
            },
            crawl: CrawlConfig::default(),
            output: OutputConfig {
                database_path: "./betterplace.db".to_string(),
                full_table: "projects_vf".to_string(),
                incremental_table: "projects_vf_backup".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let mut config = valid_config();
        config.api.base_url = "ftp://api.betterplace.org".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let mut config = valid_config();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_zero_per_page() {
        let mut config = valid_config();
        config.api.per_page = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_zero_retry_attempts() {
        let mut config = valid_config();
        config.api.retry_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_max_pages() {
        let mut config = valid_config();
        config.crawl.max_pages = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_sql_unsafe_table_name() {
        let mut config = valid_config();
        config.output.full_table = "projects; DROP TABLE runs".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_table_name_starting_with_digit() {
        let mut config = valid_config();
        config.output.incremental_table = "2projects".to_string();
        assert!(validate(&config).is_err());
    }
}
