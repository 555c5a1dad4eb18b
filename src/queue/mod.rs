//! Downstream task dispatch
//!
//! Every stored crawl is handed to a named queue as a `process-crawl` task so
//! downstream workers can pick it up. The queue is a narrow collaborator: the
//! crawl core only knows how to dispatch an envelope, nothing about consumers.
//!
//! # Example
//!
//! ```rust,ignore
//! use gale::config::QueueConfig;
//! use gale::queue::{ProcessQueue, RedisProcessQueue};
//!
//! let queue = RedisProcessQueue::new(&config.queue)?;
//! queue.dispatch(&stored_crawl).await?;
//! ```

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::config::QueueConfig;
use crate::models::StoredCrawl;
use crate::utils::error::QueueError;

/// Task name downstream workers subscribe to
pub const PROCESS_CRAWL_TASK: &str = "process-crawl";

/// Serialized message pushed onto the queue, one per stored crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Task name (always [`PROCESS_CRAWL_TASK`])
    pub task: String,

    /// The stored record the task refers to
    pub crawl: StoredCrawl,
}

impl TaskEnvelope {
    /// Wrap a stored crawl in a process-crawl envelope
    pub fn process_crawl(crawl: &StoredCrawl) -> Self {
        Self {
            task: PROCESS_CRAWL_TASK.to_string(),
            crawl: crawl.clone(),
        }
    }
}

/// Dispatch interface for the downstream processing queue
#[async_trait]
pub trait ProcessQueue: Send + Sync {
    /// Enqueue a process-crawl task for one stored record
    async fn dispatch(&self, crawl: &StoredCrawl) -> Result<(), QueueError>;
}

/// Redis-backed process queue
///
/// Pushes JSON envelopes onto a Redis list; workers consume with BRPOP so
/// delivery order matches dispatch order.
pub struct RedisProcessQueue {
    pool: Pool,
    queue_name: String,
}

impl RedisProcessQueue {
    /// Create a queue client from configuration
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Pool` if the connection pool cannot be created
    pub fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        let mut cfg = PoolConfig::from_url(&config.redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| QueueError::Pool(e.to_string()))?;

        Ok(Self {
            pool,
            queue_name: config.queue_name.clone(),
        })
    }
}

#[async_trait]
impl ProcessQueue for RedisProcessQueue {
    async fn dispatch(&self, crawl: &StoredCrawl) -> Result<(), QueueError> {
        let payload = serde_json::to_string(&TaskEnvelope::process_crawl(crawl))?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| QueueError::Pool(e.to_string()))?;

        let _: i64 = conn.lpush(&self.queue_name, payload).await?;

        tracing::debug!(
            queue = %self.queue_name,
            crawl_id = crawl.id,
            article_id = %crawl.article_id,
            "Dispatched process-crawl task"
        );

        Ok(())
    }
}

/// In-memory process queue
///
/// Useful for testing without a Redis dependency; records every dispatched
/// envelope in order.
#[derive(Default)]
pub struct MemoryProcessQueue {
    envelopes: Mutex<Vec<TaskEnvelope>>,
}

impl MemoryProcessQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of dispatched envelopes
    pub fn len(&self) -> usize {
        self.envelopes.lock().unwrap().len()
    }

    /// Check if nothing was dispatched
    pub fn is_empty(&self) -> bool {
        self.envelopes.lock().unwrap().is_empty()
    }

    /// Snapshot of all dispatched envelopes in dispatch order
    pub fn envelopes(&self) -> Vec<TaskEnvelope> {
        self.envelopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessQueue for MemoryProcessQueue {
    async fn dispatch(&self, crawl: &StoredCrawl) -> Result<(), QueueError> {
        self.envelopes
            .lock()
            .unwrap()
            .push(TaskEnvelope::process_crawl(crawl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use chrono::Utc;

    fn sample_crawl() -> StoredCrawl {
        StoredCrawl {
            id: 1,
            article_id: "84e7a531-986a-5293-b7a7-c343466738a0".to_string(),
            keyword_string: "House".to_string(),
            language: Language::En,
            text: "some snippet".to_string(),
            content_hash: "abc123".to_string(),
            crawled_at: Utc::now(),
        }
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = TaskEnvelope::process_crawl(&sample_crawl());
        let json = serde_json::to_string(&envelope).unwrap();

        assert!(json.contains("\"task\":\"process-crawl\""));
        assert!(json.contains("84e7a531-986a-5293-b7a7-c343466738a0"));

        let parsed: TaskEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.task, PROCESS_CRAWL_TASK);
        assert_eq!(parsed.crawl.keyword_string, "House");
    }

    #[tokio::test]
    async fn test_memory_queue_records_dispatch_order() {
        let queue = MemoryProcessQueue::new();
        assert!(queue.is_empty());

        let mut first = sample_crawl();
        first.id = 1;
        let mut second = sample_crawl();
        second.id = 2;

        queue.dispatch(&first).await.unwrap();
        queue.dispatch(&second).await.unwrap();

        let envelopes = queue.envelopes();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].crawl.id, 1);
        assert_eq!(envelopes[1].crawl.id, 2);
    }

    #[test]
    fn test_redis_queue_creation() {
        let config = QueueConfig {
            redis_url: "redis://localhost:6379".to_string(),
            queue_name: "process-crawl".to_string(),
            pool_size: 2,
        };

        // Pool creation is lazy; no server needs to be running
        let queue = RedisProcessQueue::new(&config);
        assert!(queue.is_ok());
    }
}
