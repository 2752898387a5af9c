//! Configuration module for Linkweave
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an absent file behaves like `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use linkweave::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkweave.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, HistoryConfig, StrategyOrder, DEFAULT_RELAYS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
