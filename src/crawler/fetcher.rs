//! HTTP fetcher for the article search endpoint
//!
//! This module wraps every search request in the continuous-request policy:
//! - Client-side rate limiting with governor
//! - Bounded retry with a fixed backoff while the provider signals faults
//! - Immediate abort on transport failures and unexpected statuses
//!
//! Rate-limit rejections are routine under load and logged at INFO; transport
//! errors and non-OK statuses indicate a more serious condition and abort the
//! page chain.

use crate::crawler::response::{classify, PageOutcome, RawDocument, SearchBody};
use crate::utils::error::FetchError;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

/// Provider service root
const DEFAULT_BASE_URL: &str = "https://api.nytimes.com/svc";

/// Article search endpoint path under the service root
const SEARCH_PATH: &str = "/search/v2/articlesearch.json";

/// How many rate-limit rejections to wait out before aborting a page
const DEFAULT_RETRY_LIMIT: u32 = 10;

/// Fixed sleep after a rate-limit rejection
const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);

/// Article search fetcher
///
/// Holds the HTTP client, the request-budget limiter, and the retry policy
/// for one provider credential. The retry count is local to each page
/// request; a fresh page starts with a fresh budget.
pub struct SearchFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// API key appended to every search request
    api_key: String,

    /// Maximum rate-limit rejections tolerated per page
    retry_limit: u32,

    /// Sleep between rate-limited attempts
    rate_limit_backoff: Duration,

    /// Service root; overridden in tests to point at a mock server
    base_url: String,
}

impl SearchFetcher {
    /// Create a new fetcher with default retry policy
    ///
    /// # Arguments
    ///
    /// * `api_key` - Provider API key
    /// * `requests_per_minute` - Client-side request budget
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(api_key: &str, requests_per_minute: u32) -> Result<Self, FetchError> {
        Self::with_config(
            api_key,
            requests_per_minute,
            DEFAULT_RETRY_LIMIT,
            DEFAULT_RATE_LIMIT_BACKOFF,
            Duration::from_secs(30),
        )
    }

    /// Create a new fetcher with custom retry policy
    ///
    /// # Arguments
    ///
    /// * `api_key` - Provider API key
    /// * `requests_per_minute` - Client-side request budget
    /// * `retry_limit` - Rate-limit rejections tolerated per page
    /// * `rate_limit_backoff` - Sleep between rate-limited attempts
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        api_key: &str,
        requests_per_minute: u32,
        retry_limit: u32,
        rate_limit_backoff: Duration,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("gale/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rate = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::new(1).unwrap());
        let quota = Quota::per_minute(rate);
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            api_key: api_key.to_string(),
            retry_limit,
            rate_limit_backoff,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a new fetcher with a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        requests_per_minute: u32,
    ) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(api_key, requests_per_minute)?;
        fetcher.base_url = base_url.trim_end_matches('/').to_string();
        Ok(fetcher)
    }

    /// Create a new fetcher with custom retry policy and base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config_and_base_url(
        base_url: &str,
        api_key: &str,
        requests_per_minute: u32,
        retry_limit: u32,
        rate_limit_backoff: Duration,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(
            api_key,
            requests_per_minute,
            retry_limit,
            rate_limit_backoff,
            timeout,
        )?;
        fetcher.base_url = base_url.trim_end_matches('/').to_string();
        Ok(fetcher)
    }

    /// Fetch one result page for a keyword
    ///
    /// Builds the article search request for the zero-based `page` and sends
    /// it through the continuous-request policy.
    ///
    /// # Errors
    ///
    /// * `FetchError::Http` - transport failure, aborts the page immediately
    /// * `FetchError::RetryBudgetExhausted` - faults outlasted the retry budget
    /// * `FetchError::UnexpectedStatus` - non-OK status without a fault entry
    pub async fn fetch_page(
        &self,
        query: &str,
        page: usize,
    ) -> Result<Vec<RawDocument>, FetchError> {
        let url = self.build_search_url(query, page)?;

        tracing::info!(keyword = %query, page, "Sending article search request");

        self.send_continuous(&url).await
    }

    /// Send a request until it yields a result page or the chain aborts
    ///
    /// One attempt per loop turn: transport failures abort immediately, a
    /// fault sleeps out the backoff and retries until the budget is spent,
    /// a non-OK status aborts without retry.
    async fn send_continuous(&self, url: &Url) -> Result<Vec<RawDocument>, FetchError> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let body = match self.send_once(url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Search request failed at the transport level, aborting page"
                    );
                    return Err(e);
                }
            };

            match classify(body) {
                PageOutcome::Fault(reason) => {
                    if retries == self.retry_limit {
                        tracing::error!(
                            retries,
                            "Retry limit reached while rate limited, aborting page"
                        );
                        return Err(FetchError::RetryBudgetExhausted { retries });
                    }

                    tracing::info!(
                        reason = %reason,
                        backoff_secs = self.rate_limit_backoff.as_secs(),
                        retries,
                        "Search request rejected, backing off before retrying"
                    );
                    tokio::time::sleep(self.rate_limit_backoff).await;
                    retries += 1;
                }

                PageOutcome::UnexpectedStatus(status) => {
                    tracing::error!(status = %status, "Unexpected response status, aborting page");
                    return Err(FetchError::UnexpectedStatus(status));
                }

                PageOutcome::Ok(docs) => return Ok(docs),
            }
        }
    }

    /// Send one request and parse the JSON body
    ///
    /// The body is parsed regardless of the HTTP status code; the provider
    /// delivers fault envelopes on non-success codes.
    async fn send_once(&self, url: &Url) -> Result<SearchBody, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let body = response.json::<SearchBody>().await?;
        Ok(body)
    }

    /// Build the article search URL for a query and zero-based page
    fn build_search_url(&self, query: &str, page: usize) -> Result<Url, FetchError> {
        let endpoint = format!("{}{}", self.base_url, SEARCH_PATH);
        let mut url = Url::parse(&endpoint).map_err(|e| {
            FetchError::InvalidUrl(format!("Failed to parse {endpoint}: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .append_pair("api-key", &self.api_key);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = SearchFetcher::new("test-key", 10);
        assert!(fetcher.is_ok());

        let fetcher = SearchFetcher::with_config(
            "test-key",
            5,
            3,
            Duration::from_millis(10),
            Duration::from_secs(10),
        );
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_fetcher_with_base_url() {
        let fetcher = SearchFetcher::with_base_url("http://localhost:8080/", "test-key", 10);
        assert!(fetcher.is_ok());
        assert_eq!(fetcher.unwrap().base_url, "http://localhost:8080");
    }

    #[test]
    fn test_build_search_url() {
        let fetcher = SearchFetcher::new("test-key", 10).unwrap();
        let url = fetcher.build_search_url("House", 3).unwrap();

        assert!(url.as_str().starts_with(
            "https://api.nytimes.com/svc/search/v2/articlesearch.json?"
        ));
        assert!(url.query_pairs().any(|(k, v)| k == "q" && v == "House"));
        assert!(url.query_pairs().any(|(k, v)| k == "page" && v == "3"));
        assert!(url.query_pairs().any(|(k, v)| k == "api-key" && v == "test-key"));
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let fetcher = SearchFetcher::new("test-key", 10).unwrap();
        let url = fetcher.build_search_url("White House", 0).unwrap();

        assert!(url.query_pairs().any(|(k, v)| k == "q" && v == "White House"));
        assert!(!url.as_str().contains("q=White House"));
    }

    #[test]
    fn test_zero_rate_falls_back_to_one() {
        let fetcher = SearchFetcher::new("test-key", 0);
        assert!(fetcher.is_ok());
    }
}
