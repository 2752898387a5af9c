use crate::config::types::{Config, CrawlerConfig, FetchConfig, HistoryConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound for parallel fetches
const MAX_CONCURRENCY: usize = 32;

/// Upper bound for the backoff unit (milliseconds)
const MAX_BASE_DELAY_MS: u64 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_history_config(&config.history)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    Ok(())
}

/// Validates fetch gateway configuration
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    for relay in &config.relays {
        validate_relay_prefix(relay)?;
    }

    if config.base_delay_ms > MAX_BASE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms must be <= {}ms, got {}ms",
            MAX_BASE_DELAY_MS, config.base_delay_ms
        )));
    }

    if config.attempt_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "attempt_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates history configuration
fn validate_history_config(config: &HistoryConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if let Some(owner) = &config.owner {
        if owner.trim().is_empty() {
            return Err(ConfigError::Validation(
                "owner cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Relay prefixes must themselves be absolute HTTP(S) URLs
fn validate_relay_prefix(prefix: &str) -> ConfigResult<()> {
    let url = Url::parse(prefix)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid relay '{}': {}", prefix, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Relay '{}' must use HTTP or HTTPS",
            prefix
        )));
    }

    Ok(())
}
