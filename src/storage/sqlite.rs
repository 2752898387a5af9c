//! SQLite history store
//!
//! This module provides a SQLite-based implementation of the HistoryStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{HistoryStore, StorageError, StorageResult};
use crate::storage::{CrawlRecord, SavedCrawl};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite history backend
pub struct SqliteHistoryStore {
    conn: Connection,
}

/// Row of the `crawls` table before its URLs are attached
struct CrawlRow {
    id: i64,
    owner_id: String,
    seed: String,
    url_count: usize,
    created_at: String,
}

impl SqliteHistoryStore {
    /// Creates a new SqliteHistoryStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteHistoryStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened history database at {}", path.display());
        Ok(Self { conn })
    }

    /// Creates an in-memory database (history lasts as long as the store)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_urls(&self, crawl_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM crawl_urls WHERE crawl_id = ?1 ORDER BY position")?;

        let urls = stmt
            .query_map(params![crawl_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    fn hydrate(&self, row: CrawlRow) -> StorageResult<SavedCrawl> {
        let timestamp = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StorageError::CorruptRecord {
                id: row.id,
                reason: format!("bad timestamp '{}': {}", row.created_at, e),
            })?
            .with_timezone(&Utc);

        let urls = self.load_urls(row.id)?;
        if urls.len() != row.url_count {
            tracing::warn!(
                "Crawl {} lists {} URLs but stores {}",
                row.id,
                row.url_count,
                urls.len()
            );
        }

        Ok(SavedCrawl {
            id: row.id,
            owner_id: row.owner_id,
            record: CrawlRecord {
                seed: row.seed,
                url_count: row.url_count,
                urls,
                timestamp,
            },
        })
    }
}

fn map_crawl_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CrawlRow> {
    Ok(CrawlRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        seed: row.get(2)?,
        url_count: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl HistoryStore for SqliteHistoryStore {
    fn save(&mut self, owner_id: &str, record: &CrawlRecord) -> StorageResult<i64> {
        if owner_id.trim().is_empty() {
            return Err(StorageError::InvalidOwner);
        }

        // Fixed precision keeps lexical and chronological order identical
        let created_at = record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO crawls (owner_id, seed, url_count, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, record.seed, record.urls.len(), created_at],
        )?;
        let crawl_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO crawl_urls (crawl_id, position, url) VALUES (?1, ?2, ?3)",
            )?;
            for (position, url) in record.urls.iter().enumerate() {
                stmt.execute(params![crawl_id, position, url])?;
            }
        }

        tx.commit()?;

        tracing::info!(
            "Saved crawl {} of {} ({} URLs) for {}",
            crawl_id,
            record.seed,
            record.urls.len(),
            owner_id
        );
        Ok(crawl_id)
    }

    fn list(&self, owner_id: &str) -> StorageResult<Vec<SavedCrawl>> {
        let rows = {
            let mut stmt = self.conn.prepare(
                "SELECT id, owner_id, seed, url_count, created_at FROM crawls
                 WHERE owner_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map(params![owner_id], map_crawl_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn get(&self, record_id: i64) -> StorageResult<Option<SavedCrawl>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, owner_id, seed, url_count, created_at FROM crawls WHERE id = ?1",
                params![record_id],
                map_crawl_row,
            )
            .optional()?;

        row.map(|row| self.hydrate(row)).transpose()
    }

    fn delete(&mut self, record_id: i64) -> StorageResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM crawls WHERE id = ?1", params![record_id])?;

        if deleted > 0 {
            tracing::info!("Deleted crawl {}", record_id);
        }
        Ok(deleted > 0)
    }
}
