//! Search pagination and crawl orchestration
//!
//! This module drives the article search across result pages for one keyword.
//! The crawl is fully sequential: pages are requested one at a time, the only
//! suspension point is the rate-limit backoff inside the fetcher, and an
//! aborted page chain ends pagination with whatever was accumulated so far.

pub mod fetcher;
pub mod response;

use crate::config::Config;
use crate::models::{ArticleRecord, Language};
use crate::parser::{normalize_document, Normalized};
use crate::utils::error::FetchError;
use fetcher::SearchFetcher;

/// Documents the provider returns per result page
pub const ARTICLES_PER_REQUEST: usize = 10;

/// Deepest page the provider allows
pub const PAGE_LIMIT: usize = 200;

/// Number of pages to attempt for a requested article limit
///
/// Bounded both by the provider capability and by the caller's limit:
/// `min(ARTICLES_PER_REQUEST * PAGE_LIMIT, ceil(limit / ARTICLES_PER_REQUEST))`.
/// A limit of zero yields zero requests.
pub fn page_budget(limit: usize) -> usize {
    (ARTICLES_PER_REQUEST * PAGE_LIMIT).min(limit.div_ceil(ARTICLES_PER_REQUEST))
}

/// Result of one keyword crawl, with observability counters
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Normalized records in page order, then within-page order
    pub records: Vec<ArticleRecord>,

    /// Pages that yielded a valid response
    pub pages_fetched: u32,

    /// Raw documents seen across all fetched pages
    pub documents_seen: u32,

    /// Documents dropped during normalization
    pub skipped: u32,

    /// Pagination stopped on an aborted page chain
    pub aborted: bool,
}

/// Article search crawler for the New York Times
///
/// NYT only allows non-commercial use of their service; commercial use
/// requires contacting them. <https://developer.nytimes.com/faq#a9>
pub struct NytCrawler {
    fetcher: SearchFetcher,
}

impl NytCrawler {
    /// Create a crawler from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let fetcher = SearchFetcher::with_config_and_base_url(
            &config.api.base_url,
            &config.api.key,
            config.crawler.requests_per_minute,
            config.crawler.retry_limit,
            config.rate_limit_backoff(),
            config.request_timeout(),
        )?;

        Ok(Self { fetcher })
    }

    /// Create a crawler around an existing fetcher
    #[must_use]
    pub fn with_fetcher(fetcher: SearchFetcher) -> Self {
        Self { fetcher }
    }

    /// Crawl result pages for a keyword and return the outcome with counters
    ///
    /// Requests pages `0..page_budget(limit)` in order. An aborted page chain
    /// (transport failure, spent retry budget, unexpected status) or an empty
    /// result page stops pagination; everything accumulated up to that point
    /// is returned. The record list is truncated to `limit` at the end, so a
    /// limit that is not a multiple of the page size still fetches whole
    /// pages and trims only the final sequence.
    pub async fn crawl(
        &self,
        keyword_string: &str,
        language: Language,
        limit: usize,
    ) -> CrawlOutcome {
        let pages = page_budget(limit);
        let mut outcome = CrawlOutcome::default();

        for page in 0..pages {
            let docs = match self.fetcher.fetch_page(keyword_string, page).await {
                Ok(docs) => docs,
                Err(e) => {
                    tracing::warn!(
                        keyword = %keyword_string,
                        page,
                        error = %e,
                        "Page chain aborted, returning partial results"
                    );
                    outcome.aborted = true;
                    break;
                }
            };

            outcome.pages_fetched += 1;

            if docs.is_empty() {
                tracing::debug!(keyword = %keyword_string, page, "Empty result page, stopping pagination");
                break;
            }

            outcome.documents_seen += docs.len() as u32;

            for doc in &docs {
                match normalize_document(keyword_string, language, doc) {
                    Normalized::Record(record) => outcome.records.push(record),
                    Normalized::Skipped(reason) => {
                        tracing::debug!(keyword = %keyword_string, page, %reason, "Dropping document");
                        outcome.skipped += 1;
                    }
                }
            }
        }

        outcome.records.truncate(limit);
        outcome
    }

    /// Get articles for a keyword, up to `limit`
    ///
    /// Convenience wrapper over [`crawl`](Self::crawl) that discards the
    /// counters. Callers always receive an ordered, possibly empty or
    /// partial list; retry counts, fault strings, and transport errors stay
    /// internal.
    pub async fn get_articles(
        &self,
        keyword_string: &str,
        language: Language,
        limit: usize,
    ) -> Vec<ArticleRecord> {
        self.crawl(keyword_string, language, limit).await.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_budget_zero_limit() {
        assert_eq!(page_budget(0), 0);
    }

    #[test]
    fn test_page_budget_rounds_up() {
        assert_eq!(page_budget(1), 1);
        assert_eq!(page_budget(5), 1);
        assert_eq!(page_budget(10), 1);
        assert_eq!(page_budget(11), 2);
        assert_eq!(page_budget(100), 10);
    }

    #[test]
    fn test_page_budget_capped_by_provider() {
        assert_eq!(page_budget(usize::MAX), ARTICLES_PER_REQUEST * PAGE_LIMIT);
    }

    #[test]
    fn test_crawler_creation() {
        let mut config = Config::default();
        config.api.key = "test-key".to_string();
        let crawler = NytCrawler::new(&config);
        assert!(crawler.is_ok());
    }
}
