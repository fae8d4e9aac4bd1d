//! Request admission gate.
//!
//! Checks run in a fixed order and the first failure decides the response:
//!
//! ```text
//! method (GET only)     → 405
//! bot filter            → 403
//! origin                → 403
//! rate limit            → 429   (consumes a slot on every request reaching it)
//! ```
//!
//! Route-specific validation happens afterwards in the handlers, so a
//! malformed request still costs the client one rate-limit slot.
//!
//! The bot filter only looks for a browser marker in `User-Agent`. Any client
//! can send one; it sheds casual scrapers and is not a security boundary.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GateConfig;
use crate::error::ApiError;
use crate::observability::metrics;
use crate::security::headers::{client_identity, is_browser};
use crate::security::rate_limit::RateLimiter;

/// Outcome of the gate for one request.
#[derive(Debug)]
pub enum AccessDecision {
    Allow,
    Deny(ApiError),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Ordered admission checks shared by every route.
pub struct RequestGate {
    allowed_origin: String,
    browser_markers: Vec<String>,
    client_ip_header: String,
    limiter: RateLimiter,
}

impl RequestGate {
    pub fn new(config: &GateConfig, limiter: RateLimiter) -> Self {
        Self {
            allowed_origin: config.allowed_origin.clone(),
            browser_markers: config.browser_markers.clone(),
            client_ip_header: config.client_ip_header.clone(),
            limiter,
        }
    }

    /// Decide whether a request with `method` and `headers` may proceed.
    pub async fn evaluate(&self, method: &Method, headers: &HeaderMap) -> AccessDecision {
        if method != Method::GET {
            return AccessDecision::Deny(ApiError::MethodNotAllowed);
        }

        if !is_browser(headers, &self.browser_markers) {
            return AccessDecision::Deny(ApiError::BotRejected);
        }

        if let Some(origin) = headers.get(header::ORIGIN) {
            if origin.as_bytes() != self.allowed_origin.as_bytes() {
                return AccessDecision::Deny(ApiError::OriginRejected);
            }
        }

        let client = client_identity(headers, &self.client_ip_header);
        match self.limiter.allow(&client).await {
            Ok(true) => AccessDecision::Allow,
            Ok(false) => AccessDecision::Deny(ApiError::RateLimited),
            Err(e) => AccessDecision::Deny(e.into()),
        }
    }
}

/// Middleware running the gate in front of every route.
pub async fn gate_middleware(
    State(gate): State<Arc<RequestGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.evaluate(request.method(), request.headers()).await {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Deny(err) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = err.reason(),
                "Request denied by gate"
            );
            metrics::record_denied(err.reason());
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::store::{KvStore, MemoryKvStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ORIGIN: &str = "https://anime.example";
    const BROWSER: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

    /// Counts calls and delegates to an in-memory store.
    #[derive(Default)]
    struct SpyStore {
        inner: MemoryKvStore,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl KvStore for SpyStore {
        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Kv("connection refused".into()));
            }
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, value, ttl).await
        }
    }

    fn gate(store: Arc<SpyStore>) -> RequestGate {
        let config = GateConfig {
            allowed_origin: ORIGIN.to_string(),
            ..GateConfig::default()
        };
        let limiter = RateLimiter::new(store, &RateLimitConfig::default());
        RequestGate::new(&config, limiter)
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    fn status(decision: AccessDecision) -> Option<u16> {
        match decision {
            AccessDecision::Allow => None,
            AccessDecision::Deny(e) => Some(e.status_code().as_u16()),
        }
    }

    #[tokio::test]
    async fn test_non_get_rejected_before_other_checks() {
        let store = Arc::new(SpyStore::default());
        let gate = gate(store.clone());
        // Headers that would fail every later check.
        let bad = headers(&[("user-agent", "curl/8"), ("origin", "https://evil.example")]);

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD, Method::OPTIONS] {
            assert_eq!(status(gate.evaluate(&method, &bad).await), Some(405));
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bot_rejected_regardless_of_other_headers() {
        let store = Arc::new(SpyStore::default());
        let gate = gate(store.clone());

        let h = headers(&[("user-agent", "python-requests/2.31"), ("origin", ORIGIN)]);
        assert_eq!(status(gate.evaluate(&Method::GET, &h).await), Some(403));

        let h = headers(&[("origin", ORIGIN), ("cf-connecting-ip", "198.51.100.1")]);
        assert_eq!(status(gate.evaluate(&Method::GET, &h).await), Some(403));

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_origin_check() {
        let store = Arc::new(SpyStore::default());
        let gate = gate(store.clone());

        let h = headers(&[("user-agent", BROWSER), ("origin", "https://evil.example")]);
        assert_eq!(status(gate.evaluate(&Method::GET, &h).await), Some(403));

        // Prefix of the allowed origin is still a mismatch.
        let h = headers(&[("user-agent", BROWSER), ("origin", "https://anime.example.evil")]);
        assert_eq!(status(gate.evaluate(&Method::GET, &h).await), Some(403));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        let h = headers(&[("user-agent", BROWSER), ("origin", ORIGIN)]);
        assert!(gate.evaluate(&Method::GET, &h).await.is_allowed());

        let h = headers(&[("user-agent", BROWSER)]);
        assert!(gate.evaluate(&Method::GET, &h).await.is_allowed());
    }

    #[tokio::test]
    async fn test_rate_limit_is_last() {
        let store = Arc::new(SpyStore::default());
        let gate = gate(store.clone());
        let h = headers(&[("user-agent", BROWSER), ("cf-connecting-ip", "198.51.100.1")]);

        for _ in 0..40 {
            assert!(gate.evaluate(&Method::GET, &h).await.is_allowed());
        }
        assert_eq!(status(gate.evaluate(&Method::GET, &h).await), Some(429));

        // A different client is unaffected.
        let other = headers(&[("user-agent", BROWSER), ("cf-connecting-ip", "198.51.100.2")]);
        assert!(gate.evaluate(&Method::GET, &other).await.is_allowed());
    }

    #[tokio::test]
    async fn test_clients_without_identity_share_a_bucket() {
        let store = Arc::new(SpyStore::default());
        let gate = gate(store.clone());
        let a = headers(&[("user-agent", BROWSER)]);
        let b = headers(&[("user-agent", BROWSER), ("cf-connecting-ip", "garbage")]);

        for _ in 0..20 {
            assert!(gate.evaluate(&Method::GET, &a).await.is_allowed());
            assert!(gate.evaluate(&Method::GET, &b).await.is_allowed());
        }
        assert_eq!(status(gate.evaluate(&Method::GET, &a).await), Some(429));
        assert_eq!(
            store.inner.get("rl:unknown").await.unwrap().as_deref(),
            Some("40")
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let store = Arc::new(SpyStore {
            fail: true,
            ..SpyStore::default()
        });
        let gate = gate(store);
        let h = headers(&[("user-agent", BROWSER)]);

        match gate.evaluate(&Method::GET, &h).await {
            AccessDecision::Deny(e) => {
                assert_eq!(e.status_code().as_u16(), 500);
                assert_eq!(e.to_string(), "Internal Error");
            }
            AccessDecision::Allow => panic!("expected denial"),
        }
    }
}
