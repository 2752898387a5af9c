//! Crawl engine - breadth-first traversal orchestration
//!
//! This module contains the main crawl loop, which coordinates:
//! - Popping frontier entries in FIFO order and marking them visited
//! - Enforcing the page budget and depth bound
//! - Fetching pages through a `PageSource` (optionally several at once)
//! - Extracting links and applying the same-origin filter
//! - Reporting progress and honouring cancellation

use crate::config::CrawlerConfig;
use crate::crawler::cancel::CancelToken;
use crate::crawler::frontier::{CrawlState, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::crawler::{FetchGateway, PageSource};
use crate::url::matches_origin;
use crate::{Result, WeaveError};
use futures::future::join_all;
use std::sync::Arc;
use url::Url;

/// Bounds for one crawl; immutable while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Links found on pages at this level are recorded but not followed
    pub max_depth: u32,

    /// Discard links whose origin differs from the seed's
    pub same_origin_only: bool,

    /// Upper bound on fetched pages (not on discovered links)
    pub max_pages: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            same_origin_only: true,
            max_pages: 200,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            same_origin_only: config.same_origin_only,
            max_pages: config.max_pages,
        }
    }
}

/// Outcome of a completed crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Canonical seed URL
    pub seed: String,

    /// Discovered URLs in discovery order, without duplicates
    pub urls: Vec<String>,

    pub url_count: usize,

    /// Pages fetched (or attempted)
    pub pages_visited: usize,

    /// Pages whose fetch failed on every strategy
    pub fetch_failures: usize,
}

/// Observational notifications emitted during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// About to fetch a page
    Fetching {
        url: String,
        level: u32,
        /// Pages marked visited so far, this one included
        visited: usize,
    },

    /// Every fetch strategy failed for a page
    FetchFailed { url: String, error: String },

    /// Crawl ended normally
    Finished { discovered: usize, fetched: usize },
}

/// Receives `CrawlEvent`s; must not block
pub type ProgressCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

/// Breadth-first crawler over a `PageSource`
pub struct CrawlEngine<S = FetchGateway> {
    source: S,
    concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl<S: PageSource> CrawlEngine<S> {
    /// Creates a sequential engine
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency: 1,
            progress: None,
        }
    }

    /// Allows up to `concurrency` fetches in flight at once (minimum 1)
    ///
    /// Discovered URLs, their order and their levels do not depend on this
    /// value: results of a batch are applied in the order entries were popped.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Registers a progress callback
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Crawls from `seed` until the frontier is empty or the page budget is spent
    ///
    /// # Arguments
    ///
    /// * `seed` - Canonical absolute seed URL (see `normalize_url`)
    /// * `options` - Depth, page and origin bounds
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Crawl finished; individual fetch failures are
    ///   counted, not returned
    ///
    /// # Example
    ///
    /// ```no_run
    /// use linkweave::config::FetchConfig;
    /// use linkweave::crawler::{CrawlEngine, CrawlOptions, FetchGateway};
    /// use linkweave::normalize_url;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let gateway = FetchGateway::from_config(&FetchConfig::default())?;
    /// let engine = CrawlEngine::new(gateway);
    /// let seed = normalize_url("example.com")?;
    /// let result = engine.crawl(&seed, &CrawlOptions::default()).await?;
    /// println!("{} links", result.url_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, seed: &Url, options: &CrawlOptions) -> Result<CrawlResult> {
        self.crawl_with_cancellation(seed, options, &CancelToken::never())
            .await
    }

    /// Same as `crawl`, but abandons the traversal when `cancel` fires
    ///
    /// No new fetch is started after cancellation and in-flight fetches are
    /// dropped. The partial state is discarded and `WeaveError::Cancelled`
    /// is returned.
    pub async fn crawl_with_cancellation(
        &self,
        seed: &Url,
        options: &CrawlOptions,
        cancel: &CancelToken,
    ) -> Result<CrawlResult> {
        let start_origin = seed.origin();
        let mut state = CrawlState::new(seed.clone());

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, same origin only: {})",
            seed,
            options.max_depth,
            options.max_pages,
            options.same_origin_only
        );

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Crawl of {} cancelled", seed);
                return Err(WeaveError::Cancelled);
            }

            let remaining = options.max_pages.saturating_sub(state.visited_count());
            if remaining == 0 {
                tracing::info!("Page limit of {} reached", options.max_pages);
                break;
            }

            let batch = state.next_batch(self.concurrency.min(remaining));
            if batch.is_empty() {
                tracing::debug!("Frontier is empty");
                break;
            }

            for (offset, entry) in batch.iter().enumerate() {
                // Batch entries are already counted in visited
                let visited = state.visited_count() - batch.len() + offset + 1;
                tracing::debug!("Fetching {} (level {})", entry.url, entry.level);
                self.notify(&CrawlEvent::Fetching {
                    url: entry.url.to_string(),
                    level: entry.level,
                    visited,
                });
            }

            let fetches = join_all(batch.iter().map(|entry| self.source.fetch_page(&entry.url)));
            let bodies = tokio::select! {
                bodies = fetches => bodies,
                _ = cancel.cancelled() => {
                    tracing::info!("Crawl of {} cancelled with fetches in flight", seed);
                    return Err(WeaveError::Cancelled);
                }
            };

            for (entry, body) in batch.into_iter().zip(bodies) {
                match body {
                    Ok(body) => self.absorb_links(&mut state, &entry, &body, &start_origin, options),
                    Err(e) => {
                        tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                        state.record_failure();
                        self.notify(&CrawlEvent::FetchFailed {
                            url: entry.url.to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        let result = state.into_result();

        tracing::info!(
            "Crawl complete: {} unique links from {} pages ({} failed)",
            result.url_count,
            result.pages_visited,
            result.fetch_failures
        );
        self.notify(&CrawlEvent::Finished {
            discovered: result.url_count,
            fetched: result.pages_visited,
        });

        Ok(result)
    }

    /// Records the links of one fetched page
    fn absorb_links(
        &self,
        state: &mut CrawlState,
        entry: &FrontierEntry,
        body: &str,
        start_origin: &url::Origin,
        options: &CrawlOptions,
    ) {
        let mut new_links = 0;

        for link in extract_links(&entry.url, body) {
            if options.same_origin_only && !matches_origin(start_origin, &link) {
                tracing::trace!("Discarding cross-origin link {}", link);
                continue;
            }
            if state.discover(link, entry.level, options.max_depth) {
                new_links += 1;
            }
        }

        tracing::debug!("{} new links on {}", new_links, entry.url);
    }

    fn notify(&self, event: &CrawlEvent) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }
}
