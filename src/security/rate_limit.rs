//! Fixed-window rate limiting per client.
//!
//! Each accepted request rewrites the counter with a full fresh TTL, so the
//! window is measured from the most recent accepted request, not from the
//! first. Rejected requests never write, so they do not extend it.
//!
//! The read and the write are separate store calls. Concurrent requests from
//! one client can read the same count and all be accepted; the limit is
//! best-effort under bursts.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::store::{KvStore, StoreResult};

/// State for the rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    max_requests: u64,
    window: Duration,
    key_prefix: String,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// Record a request from `client_id` and report whether it may proceed.
    pub async fn allow(&self, client_id: &str) -> StoreResult<bool> {
        let key = format!("{}{}", self.key_prefix, client_id);

        let count = match self.store.get(&key).await? {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or(0),
            None => 0,
        };

        if count >= self.max_requests {
            tracing::warn!(client = %client_id, count, "Rate limit exceeded");
            metrics::record_rate_limited();
            return Ok(false);
        }

        self.store
            .put(&key, (count + 1).to_string(), self.window)
            .await?;
        Ok(true)
    }
}
