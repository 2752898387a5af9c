//! Crawl state: frontier queue, visited set, discovered set
//!
//! One `CrawlState` is owned by exactly one crawl invocation. It is created
//! from the seed, mutated only by the engine's coordinating loop, and consumed
//! into a `CrawlResult` when the crawl ends.

use crate::crawler::CrawlResult;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A pending fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical absolute URL to fetch
    pub url: Url,

    /// Shortest discovery distance from the seed (seed = 0)
    pub level: u32,
}

/// Frontier, visited and discovered containers for one crawl
///
/// Invariants:
/// - a URL enters `visited` at most once
/// - a URL enters `discovered` at most once; later sightings are no-ops
/// - a URL is enqueued only when it is first discovered (the seed aside)
#[derive(Debug)]
pub struct CrawlState {
    seed: Url,
    frontier: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    discovered: HashSet<String>,
    discovered_order: Vec<String>,
    fetch_failures: usize,
}

impl CrawlState {
    /// Creates the state with the seed queued at level 0
    pub fn new(seed: Url) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(FrontierEntry {
            url: seed.clone(),
            level: 0,
        });

        Self {
            seed,
            frontier,
            visited: HashSet::new(),
            discovered: HashSet::new(),
            discovered_order: Vec::new(),
            fetch_failures: 0,
        }
    }

    /// Pops frontier entries until one has not been visited yet
    ///
    /// The returned entry is marked visited before it is handed out, so a URL
    /// can never be dispatched twice.
    pub fn next_unvisited(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.frontier.pop_front() {
            if self.visited.insert(entry.url.to_string()) {
                return Some(entry);
            }
            tracing::trace!("Skipping already visited {}", entry.url);
        }
        None
    }

    /// Pops up to `limit` unvisited entries in FIFO order
    pub fn next_batch(&mut self, limit: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::with_capacity(limit);
        while batch.len() < limit {
            match self.next_unvisited() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        batch
    }

    /// Records a link found on a page at `parent_level`
    ///
    /// Returns true if the link was new. New links are enqueued at
    /// `parent_level + 1` only while `parent_level < max_depth`.
    pub fn discover(&mut self, link: Url, parent_level: u32, max_depth: u32) -> bool {
        let key = link.to_string();
        if !self.discovered.insert(key.clone()) {
            return false;
        }
        self.discovered_order.push(key);

        if parent_level < max_depth {
            self.frontier.push_back(FrontierEntry {
                url: link,
                level: parent_level + 1,
            });
        }

        true
    }

    /// Counts a page whose fetch failed
    pub fn record_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered_order.len()
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Consumes the state into the crawl's result
    pub fn into_result(self) -> CrawlResult {
        CrawlResult {
            seed: self.seed.to_string(),
            url_count: self.discovered_order.len(),
            urls: self.discovered_order,
            pages_visited: self.visited.len(),
            fetch_failures: self.fetch_failures,
        }
    }
}
