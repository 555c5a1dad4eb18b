//! Error types for the gale crawler
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur while talking to the article search endpoint
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request or body decoding error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request for the full retry budget
    #[error("Retry limit reached after {retries} rate-limited attempts")]
    RetryBudgetExhausted { retries: u32 },

    /// Response carried a status other than "OK" without a fault entry
    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(String),

    /// Invalid request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised when validating crawl input before any network call
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Keyword is empty or whitespace-only
    #[error("Keyword must be a non-empty string")]
    InvalidKeyword,

    /// Language is not in the supported set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Errors that can occur while dispatching tasks to the downstream queue
#[derive(Error, Debug)]
pub enum QueueError {
    /// Failed to create or check out a pooled connection
    #[error("Queue connection error: {0}")]
    Pool(String),

    /// Redis command error
    #[error("Queue command failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// Task payload could not be serialized
    #[error("Task serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
