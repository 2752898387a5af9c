use serde::Deserialize;

/// Relay endpoints tried before a direct request, in order
pub const DEFAULT_RELAYS: &[&str] = &[
    "https://api.allorigins.win/raw?url=",
    "https://r.jina.ai/http://",
    "https://api.codetabs.com/v1/proxy?quest=",
];

/// Main configuration structure for Linkweave
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub history: HistoryConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth followed from the seed (0 = seed page only)
    pub max_depth: u32,

    /// Maximum number of pages fetched in one crawl
    pub max_pages: usize,

    /// Discard links whose origin differs from the seed's
    pub same_origin_only: bool,

    /// Number of fetches allowed in flight at once
    pub concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_pages: 200,
            same_origin_only: true,
            concurrency: 1,
        }
    }
}

/// Order in which the fetch gateway tries its strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyOrder {
    /// Relays in list order, then one direct request as final fallback
    #[default]
    RelaysFirst,

    /// Direct request first, relays as fallbacks
    DirectFirst,
}

/// Fetch gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Strategy ordering policy
    pub strategy_order: StrategyOrder,

    /// Relay URL prefixes; the percent-encoded target URL is appended
    pub relays: Vec<String>,

    /// Linear backoff unit between failed attempts (milliseconds)
    pub base_delay_ms: u64,

    /// Upper bound for a single strategy attempt (seconds)
    pub attempt_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy_order: StrategyOrder::default(),
            relays: DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
            base_delay_ms: 200,
            attempt_timeout_secs: 15,
            user_agent: format!("linkweave/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Crawl history configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HistoryConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Owner the history is recorded under; no owner means nothing is saved
    pub owner: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: "linkweave.db".to_string(),
            owner: None,
        }
    }
}
