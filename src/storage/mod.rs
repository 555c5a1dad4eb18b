//! Keyword and crawl persistence
//!
//! This module holds the repository abstractions behind which the crawl core
//! talks to storage, plus the SQLite implementation.

pub mod repository;

pub use repository::{CrawlRepository, KeywordRepository, SqliteRepository, StorageStats};
