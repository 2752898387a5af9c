//! Storage module for crawl history
//!
//! This module keeps completed crawls so they can be listed, viewed again,
//! exported and deleted later, including:
//! - SQLite database initialization and schema management
//! - Saving a crawl's discovered URLs in discovery order
//! - Per-owner listing, newest first
//! - Deletion with cascading cleanup

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteHistoryStore;
pub use traits::{HistoryStore, StorageError, StorageResult};

use crate::crawler::CrawlResult;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens (or creates) a history database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteHistoryStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_history(path: &Path) -> StorageResult<SqliteHistoryStore> {
    SqliteHistoryStore::new(path)
}

/// The persisted form of a completed crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    pub seed: String,
    pub urls: Vec<String>,
    pub url_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl CrawlRecord {
    pub fn new(seed: impl Into<String>, urls: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            seed: seed.into(),
            url_count: urls.len(),
            urls,
            timestamp,
        }
    }

    /// Snapshot of a crawl result, stamped with the current time
    pub fn from_result(result: &CrawlResult) -> Self {
        Self::new(result.seed.clone(), result.urls.clone(), Utc::now())
    }
}

/// A crawl record as stored, with its id and owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCrawl {
    pub id: i64,
    pub owner_id: String,
    pub record: CrawlRecord,
}
