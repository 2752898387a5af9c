//! Linkweave: a breadth-first link mapper
//!
//! This crate discovers the pages reachable from a seed URL up to a bounded
//! depth and page count, optionally staying on the seed's origin, and returns
//! the deduplicated set of discovered URLs. Results can be rendered as a flat
//! list or a host/path tree, exported, and kept in a per-owner history.

pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors that end a crawl without a result
///
/// Individual fetch failures never surface here; they are counted in the
/// `CrawlResult`. Config, storage and output have their own error types.
#[derive(Debug, Error)]
pub enum WeaveError {
    #[error("Invalid URL: {0}")]
    Url(#[from] UrlError),

    #[error("Crawl cancelled")]
    Cancelled,
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

/// URL normalization errors
///
/// Fatal for a crawl seed; extracted links that fail to resolve are dropped
/// instead of surfacing one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Result type alias for Linkweave operations
pub type Result<T> = std::result::Result<T, WeaveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlOptions, CrawlResult, FetchGateway};
pub use output::{build_url_tree, UrlTreeNode, ViewMode};
pub use session::Session;
pub use self::url::{normalize_url, resolve_link};
