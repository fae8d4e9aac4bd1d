//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (method, bot filter, origin)
//!     → rate_limit.rs (per-IP fixed window)
//!     → Pass to routing
//!
//! Episode route only:
//!     → signature.rs (time-boxed link signature)
//! ```
//!
//! # Design Decisions
//! - First failing check wins; later checks never run
//! - Fail closed: store errors deny with 500
//! - No trust in client input beyond the configured proxy header

pub mod gate;
pub mod headers;
pub mod rate_limit;
pub mod signature;

pub use gate::{gate_middleware, AccessDecision, RequestGate};
pub use rate_limit::RateLimiter;
pub use signature::{SignatureError, SignatureVerifier};
