//! Repository pattern for database abstraction
//!
//! This module provides trait-based repository abstractions to decouple the
//! crawl logic from storage implementations, enabling:
//! - Easy testing with in-memory databases
//! - Swappable storage backends
//! - Clear separation of concerns
//!
//! The crawler never owns persistence; it hands each normalized record to a
//! repository and moves on.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{ArticleRecord, Keyword, Language, StoredCrawl};

/// Aggregate storage counters
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    pub keywords: usize,
    pub crawls: usize,
}

/// Repository resolving caller-supplied keyword input to canonical entities
pub trait KeywordRepository: Send + Sync {
    /// Resolve a keyword string and language to the canonical entity,
    /// creating it if it does not exist yet
    fn resolve_keyword(&self, keyword_string: &str, language: Language) -> Result<Keyword>;

    /// Get a keyword if it exists
    fn get_keyword(&self, keyword_string: &str, language: Language) -> Result<Option<Keyword>>;
}

/// Repository persisting normalized crawl records
pub trait CrawlRepository: Send + Sync {
    /// Persist one record, returning the stored row
    ///
    /// Saving the same `(article_id, keyword, language)` again refreshes the
    /// text, hash, and timestamp instead of erroring, so repeated scheduled
    /// crawls stay idempotent.
    fn save_crawl(&self, record: &ArticleRecord) -> Result<StoredCrawl>;

    /// Get a stored crawl by its identifying triple
    fn get_crawl(
        &self,
        article_id: &str,
        keyword_string: &str,
        language: Language,
    ) -> Result<Option<StoredCrawl>>;

    /// All stored crawls for one keyword, oldest first
    fn crawls_for_keyword(
        &self,
        keyword_string: &str,
        language: Language,
    ) -> Result<Vec<StoredCrawl>>;

    /// Count stored crawls
    fn count_crawls(&self) -> Result<usize>;

    /// Aggregate storage counters
    fn get_stats(&self) -> Result<StorageStats>;
}

/// SQLite implementation of the keyword and crawl repositories
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Create a new SQLite repository
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    /// Create database schema
    fn create_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS keywords (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    keyword TEXT NOT NULL,
                    language TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE(keyword, language)
                );

                CREATE TABLE IF NOT EXISTS crawls (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    article_id TEXT NOT NULL,
                    keyword TEXT NOT NULL,
                    language TEXT NOT NULL,
                    text TEXT NOT NULL,
                    content_hash TEXT NOT NULL,
                    crawled_at TEXT NOT NULL,
                    UNIQUE(article_id, keyword, language)
                );

                CREATE INDEX IF NOT EXISTS idx_crawls_keyword
                    ON crawls(keyword, language);

                CREATE INDEX IF NOT EXISTS idx_crawls_hash
                    ON crawls(content_hash);
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }

    /// Map one `crawls` row to a StoredCrawl
    fn crawl_from_row(row: &Row<'_>) -> rusqlite::Result<StoredCrawl> {
        let language_str: String = row.get(3)?;
        let language = Language::parse(&language_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown language: {language_str}").into(),
            )
        })?;

        Ok(StoredCrawl {
            id: row.get(0)?,
            article_id: row.get(1)?,
            keyword_string: row.get(2)?,
            language,
            text: row.get(4)?,
            content_hash: row.get(5)?,
            crawled_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(6)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

impl KeywordRepository for SqliteRepository {
    fn resolve_keyword(&self, keyword_string: &str, language: Language) -> Result<Keyword> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
                INSERT INTO keywords (keyword, language, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(keyword, language) DO NOTHING
                "#,
            params![keyword_string, language.as_str(), now],
        )
        .context("Failed to insert keyword")?;

        let keyword = conn
            .query_row(
                "SELECT id, keyword FROM keywords WHERE keyword = ?1 AND language = ?2",
                params![keyword_string, language.as_str()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .context("Failed to read back keyword")?;

        Ok(Keyword {
            id: keyword.0,
            keyword_string: keyword.1,
            language,
        })
    }

    fn get_keyword(&self, keyword_string: &str, language: Language) -> Result<Option<Keyword>> {
        let conn = self.conn.lock().unwrap();
        let keyword = conn
            .query_row(
                "SELECT id, keyword FROM keywords WHERE keyword = ?1 AND language = ?2",
                params![keyword_string, language.as_str()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .context("Failed to get keyword")?;

        Ok(keyword.map(|(id, keyword_string)| Keyword {
            id,
            keyword_string,
            language,
        }))
    }
}

impl CrawlRepository for SqliteRepository {
    fn save_crawl(&self, record: &ArticleRecord) -> Result<StoredCrawl> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let content_hash = record.content_hash();

        conn.execute(
            r#"
                INSERT INTO crawls (article_id, keyword, language, text, content_hash, crawled_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(article_id, keyword, language) DO UPDATE SET
                    text = excluded.text,
                    content_hash = excluded.content_hash,
                    crawled_at = excluded.crawled_at
                "#,
            params![
                record.article_id,
                record.keyword_string,
                record.language.as_str(),
                record.text,
                content_hash,
                now
            ],
        )
        .context("Failed to save crawl")?;

        let stored = conn
            .query_row(
                "SELECT id, article_id, keyword, language, text, content_hash, crawled_at
                 FROM crawls WHERE article_id = ?1 AND keyword = ?2 AND language = ?3",
                params![
                    record.article_id,
                    record.keyword_string,
                    record.language.as_str()
                ],
                Self::crawl_from_row,
            )
            .context("Failed to read back stored crawl")?;

        Ok(stored)
    }

    fn get_crawl(
        &self,
        article_id: &str,
        keyword_string: &str,
        language: Language,
    ) -> Result<Option<StoredCrawl>> {
        let conn = self.conn.lock().unwrap();
        let stored = conn
            .query_row(
                "SELECT id, article_id, keyword, language, text, content_hash, crawled_at
                 FROM crawls WHERE article_id = ?1 AND keyword = ?2 AND language = ?3",
                params![article_id, keyword_string, language.as_str()],
                Self::crawl_from_row,
            )
            .optional()
            .context("Failed to get crawl")?;

        Ok(stored)
    }

    fn crawls_for_keyword(
        &self,
        keyword_string: &str,
        language: Language,
    ) -> Result<Vec<StoredCrawl>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, article_id, keyword, language, text, content_hash, crawled_at
                 FROM crawls WHERE keyword = ?1 AND language = ?2 ORDER BY id",
            )
            .context("Failed to prepare keyword crawl query")?;

        let crawls = stmt
            .query_map(params![keyword_string, language.as_str()], |row| {
                Self::crawl_from_row(row)
            })
            .context("Failed to query crawls for keyword")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to map crawl rows")?;

        Ok(crawls)
    }

    fn count_crawls(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM crawls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_stats(&self) -> Result<StorageStats> {
        let conn = self.conn.lock().unwrap();
        let keywords: i64 =
            conn.query_row("SELECT COUNT(*) FROM keywords", [], |row| row.get(0))?;
        let crawls: i64 = conn.query_row("SELECT COUNT(*) FROM crawls", [], |row| row.get(0))?;

        Ok(StorageStats {
            keywords: keywords as usize,
            crawls: crawls as usize,
        })
    }
}
