//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace, security headers, panic catch-all)
//!     → security::gate (method, bot, origin, rate limit)
//!     → handlers.rs (route validation, catalog lookup)
//!     → JSON body or plain-text error
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
