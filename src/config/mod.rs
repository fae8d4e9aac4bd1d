//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (ALLOWED_ORIGIN, API_SECRET, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_sync_config, ConfigError};
pub use schema::{
    AppConfig, GateConfig, KvBackend, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    SignatureConfig, StorageConfig, SyncConfig, TimeoutConfig,
};
