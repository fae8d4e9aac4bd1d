//! Header inspection and security response headers.
//!
//! # Responsibilities
//! - Derive the client identity from the trusted proxy header
//! - Detect browser user agents
//! - Add the fixed security headers to every response
//!
//! # Design Decisions
//! - Only the configured proxy header is trusted for the client IP
//! - Missing or unparseable identities collapse into one shared bucket

use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Identity used when the proxy header is absent or not an IP address.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract the client identity from `header_name`.
pub fn client_identity(headers: &HeaderMap, header_name: &str) -> String {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Whether the `User-Agent` contains any of `markers`.
pub fn is_browser(headers: &HeaderMap, markers: &[String]) -> bool {
    let Some(agent) = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    markers
        .iter()
        .any(|marker| !marker.is_empty() && agent.contains(marker.as_str()))
}

/// Fixed headers set on every response.
pub const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::CACHE_CONTROL, "no-store"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
];

/// One overriding layer per security header.
pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS
        .iter()
        .map(|(name, value)| {
            SetResponseHeaderLayer::overriding(name.clone(), HeaderValue::from_static(value))
        })
        .collect()
}
