//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - Multi-strategy fetching with backoff and a final direct fallback
//! - HTML parsing and link extraction
//! - Frontier, visited and discovered bookkeeping
//! - Overall crawl coordination and cancellation

mod cancel;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use coordinator::{CrawlEngine, CrawlEvent, CrawlOptions, CrawlResult, ProgressCallback};
pub use fetcher::{
    backoff_delay, build_http_client, DirectStrategy, FetchError, FetchGateway, FetchStrategy,
    PageSource, RelayStrategy, StrategyError,
};
pub use frontier::{CrawlState, FrontierEntry};
pub use parser::extract_links;

use crate::session::Session;
use crate::storage::{CrawlRecord, HistoryStore};
use crate::url::normalize_url;
use crate::Result;

/// Runs a crawl from free-form seed text
///
/// The seed is normalized first; an invalid seed rejects the crawl before
/// any fetch is issued.
///
/// # Arguments
///
/// * `raw_seed` - Seed as typed by the user (`example.com`, `https://...`)
/// * `options` - Crawl bounds
/// * `engine` - The engine to drive
/// * `cancel` - Cancellation token for the whole crawl
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl finished
/// * `Err(WeaveError::Url)` - Seed could not be normalized
/// * `Err(WeaveError::Cancelled)` - Crawl was cancelled
pub async fn start_crawl<S: PageSource>(
    raw_seed: &str,
    options: &CrawlOptions,
    engine: &CrawlEngine<S>,
    cancel: &CancelToken,
) -> Result<CrawlResult> {
    let seed = normalize_url(raw_seed)?;
    engine.crawl_with_cancellation(&seed, options, cancel).await
}

/// Saves a completed crawl for the session's owner, if there is one
///
/// Storage failures are logged and swallowed: the crawl result stays valid
/// whether or not it was recorded.
///
/// # Returns
///
/// The new record id, or `None` if nothing was saved
pub fn save_to_history<H: HistoryStore + ?Sized>(
    session: &Session,
    store: &mut H,
    result: &CrawlResult,
) -> Option<i64> {
    let Some(owner_id) = session.current_owner() else {
        tracing::debug!("No signed-in owner; crawl of {} not saved", result.seed);
        return None;
    };

    match store.save(&owner_id, &CrawlRecord::from_result(result)) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!("Failed to save crawl of {} to history: {}", result.seed, e);
            None
        }
    }
}
