//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the catalog edge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Admission checks applied before routing.
    pub gate: GateConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Signed episode links.
    pub signature: SignatureConfig,

    /// Relational and key-value store handles.
    pub storage: StorageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Catalog sync job settings.
    pub sync: SyncConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// The only `Origin` value accepted when the header is present.
    pub allowed_origin: String,

    /// Substrings of `User-Agent` that identify a browser.
    pub browser_markers: Vec<String>,

    /// Header set by the fronting proxy with the client IP.
    pub client_ip_header: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allowed_origin: String::new(),
            browser_markers: vec!["Mozilla".to_string()],
            client_ip_header: "CF-Connecting-IP".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Accepted requests per client before rejection.
    pub max_requests: u64,

    /// Counter lifetime, refreshed on every accepted request.
    pub window_secs: u64,

    /// Prefix prepended to the client identity to form the store key.
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 40,
            window_secs: 60,
            key_prefix: "rl:".to_string(),
        }
    }
}

/// Signed link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Shared signing secret.
    pub secret: String,

    /// Maximum token age in seconds.
    pub max_age_secs: u64,

    /// Highest episode number a link may address.
    pub max_episode_number: u32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_age_secs: 60,
            max_episode_number: 2000,
        }
    }
}

/// Backend for the rate-limit counters.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    #[default]
    Memory,
    Redis,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// sqlx connection URL for the catalog database.
    pub database_url: String,

    /// Maximum pooled database connections.
    pub max_connections: u32,

    /// Key-value backend for rate-limit counters.
    pub kv: KvBackend,

    /// Redis URL, required when `kv = "redis"`.
    pub redis_url: Option<String>,

    /// How often the in-memory backend evicts expired entries.
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://catalog.db?mode=rwc".to_string(),
            max_connections: 5,
            kv: KvBackend::Memory,
            redis_url: None,
            sweep_interval_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Catalog sync configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// GraphQL endpoint.
    pub endpoint: String,

    /// Number of pages fetched per run.
    pub pages: u32,

    /// Items per page.
    pub per_page: u32,

    /// Seconds between runs when running periodically.
    pub interval_secs: u64,

    /// HTTP timeout for each page fetch.
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://graphql.anilist.co".to_string(),
            pages: 3,
            per_page: 50,
            interval_secs: 6 * 60 * 60,
            request_timeout_secs: 20,
        }
    }
}
