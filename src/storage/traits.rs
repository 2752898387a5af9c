//! History store trait and error types
//!
//! This module defines the interface the crawl's callers use to keep past
//! results, and the errors a backend can report.

use crate::storage::{CrawlRecord, SavedCrawl};
use thiserror::Error;

/// Errors that can occur during history operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Owner id cannot be empty")]
    InvalidOwner,

    #[error("Corrupt crawl record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only store of completed crawls, keyed by an opaque owner id
///
/// Callers only write after a crawl has fully completed, and a failed write
/// never invalidates the crawl result it was given.
pub trait HistoryStore {
    /// Saves a completed crawl under `owner_id`
    ///
    /// # Returns
    ///
    /// The id of the new record
    fn save(&mut self, owner_id: &str, record: &CrawlRecord) -> StorageResult<i64>;

    /// Lists an owner's crawls, newest first
    fn list(&self, owner_id: &str) -> StorageResult<Vec<SavedCrawl>>;

    /// Gets one crawl by id
    fn get(&self, record_id: i64) -> StorageResult<Option<SavedCrawl>>;

    /// Deletes one crawl; returns false if it did not exist
    fn delete(&mut self, record_id: i64) -> StorageResult<bool>;
}
