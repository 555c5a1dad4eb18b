//! Configuration management for the gale crawler
//!
//! This module handles loading and validating configuration from environment
//! variables and files. Credentials are explicit configuration values passed
//! into components at construction; nothing reads the environment after
//! startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Article search API configuration
    pub api: ApiConfig,

    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Downstream task queue configuration
    pub queue: QueueConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Article search API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key issued by the provider
    pub key: String,

    /// Service root URL
    pub base_url: String,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Client-side request budget (requests per minute)
    pub requests_per_minute: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// How many rate-limit rejections to wait out per page
    pub retry_limit: u32,

    /// Backoff sleep after a rate-limit rejection, in seconds
    pub rate_limit_backoff_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Downstream task queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub redis_url: String,

    /// Queue (list) name that receives process-crawl tasks
    pub queue_name: String,

    /// Connection pool size
    pub pool_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `NYT_API_KEY` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NYT_API_KEY").context("NYT_API_KEY must be set")?;

        let base_url = std::env::var("GALE_API_BASE_URL")
            .unwrap_or_else(|_| String::from("https://api.nytimes.com/svc"));

        let requests_per_minute = std::env::var("GALE_REQUESTS_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let request_timeout_secs = std::env::var("GALE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let retry_limit = std::env::var("GALE_RETRY_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let rate_limit_backoff_secs = std::env::var("GALE_RATE_LIMIT_BACKOFF")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let sqlite_path = std::env::var("GALE_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/gale.db"))
            .into();

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://localhost:6379"));

        let queue_name =
            std::env::var("GALE_QUEUE_NAME").unwrap_or_else(|_| String::from("process-crawl"));

        let pool_size = std::env::var("GALE_REDIS_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let log_level = std::env::var("GALE_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format = std::env::var("GALE_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            api: ApiConfig {
                key: api_key,
                base_url,
            },
            crawler: CrawlerConfig {
                requests_per_minute,
                request_timeout_secs,
                retry_limit,
                rate_limit_backoff_secs,
            },
            database: DatabaseConfig { sqlite_path },
            queue: QueueConfig {
                redis_url,
                queue_name,
                pool_size,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.requests_per_minute == 0 {
            anyhow::bail!("requests_per_minute must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.queue.queue_name.is_empty() {
            anyhow::bail!("queue_name must not be empty");
        }

        if self.queue.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Get rate-limit backoff as Duration
    #[must_use]
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.crawler.rate_limit_backoff_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                key: String::new(),
                base_url: String::from("https://api.nytimes.com/svc"),
            },
            crawler: CrawlerConfig {
                requests_per_minute: 10,
                request_timeout_secs: 30,
                retry_limit: 10,
                rate_limit_backoff_secs: 10,
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/gale.db"),
            },
            queue: QueueConfig {
                redis_url: String::from("redis://localhost:6379"),
                queue_name: String::from("process-crawl"),
                pool_size: 10,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_requests_per_minute() {
        let mut config = Config::default();
        config.crawler.requests_per_minute = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_queue_name_rejected() {
        let mut config = Config::default();
        config.queue.queue_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_limit_backoff(), Duration::from_secs(10));
    }
}
