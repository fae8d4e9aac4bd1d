//! Key-value storage with expiring entries.
//!
//! # Data Flow
//! ```text
//! security::rate_limit
//!     → KvStore::get(key)          (current counter, if any)
//!     → KvStore::put(key, v, ttl)  (new counter, fresh expiry)
//!
//! Backends:
//!     memory.rs (DashMap + background sweeper)
//!     redis.rs  (feature "redis", SET EX)
//! ```
//!
//! # Design Decisions
//! - Callers see strings only; no backend-specific types leak
//! - Expiry is owned by the backend, never by callers
//! - No compare-and-swap: read and write are separate round-trips

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryKvStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key-value backend failed.
    #[error("key-value backend error: {0}")]
    Kv(String),

    /// Relational store failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data did not have the expected shape.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A key-value store whose entries expire after a time-to-live.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the live value for `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value and expiry.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;
}
