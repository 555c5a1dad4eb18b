//! gale - Keyword-driven New York Times article crawler
//!
//! A crawling pipeline that queries the NYT Article Search API for a keyword,
//! paginates under the provider's rate limits, normalizes matching documents,
//! persists them, and dispatches a processing task per stored record.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Search pagination and the continuous-request retry loop
//! - [`parser`] - Raw document normalization
//! - [`models`] - Core data structures and types
//! - [`storage`] - Keyword and crawl persistence (SQLite)
//! - [`queue`] - Downstream task dispatch (Redis)
//! - [`tasks`] - Crawl entry points gluing the pieces together
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use gale::config::Config;
//! use gale::crawler::NytCrawler;
//! use gale::models::Language;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crawler = NytCrawler::new(&config)?;
//!     let articles = crawler.get_articles("House", Language::En, 100).await;
//!     println!("Fetched {} articles", articles.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod queue;
pub mod storage;
pub mod tasks;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::NytCrawler;
    pub use crate::error::{Error, ErrorCategory, GaleErrorTrait, Result};
    pub use crate::models::{ArticleRecord, CrawlSummary, Keyword, Language, StoredCrawl};
    pub use crate::queue::ProcessQueue;
    pub use crate::storage::{CrawlRepository, KeywordRepository, SqliteRepository};
}

// Direct re-exports for convenience
pub use models::{ArticleRecord, CrawlSummary, Keyword, Language, StoredCrawl};
