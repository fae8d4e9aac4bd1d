//! Catalog edge library.
//!
//! A read-only anime catalog API whose every request passes an ordered
//! admission gate (method, bot filter, origin, per-IP rate limit) and whose
//! episode links are authorized by time-boxed signatures.

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;
pub mod sync;

pub use config::AppConfig;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
