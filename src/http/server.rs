//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, security headers, panic
//!   catch-all, request deadline, gate)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http::handlers;
use crate::observability::metrics;
use crate::security::headers::security_header_layers;
use crate::security::{gate_middleware, RateLimiter, RequestGate, SignatureVerifier};
use crate::store::KvStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub verifier: Arc<SignatureVerifier>,
    pub max_episode_number: u32,
}

/// HTTP server for the catalog API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given stores.
    pub fn new(config: AppConfig, catalog: Arc<dyn CatalogStore>, kv: Arc<dyn KvStore>) -> Self {
        let limiter = RateLimiter::new(kv, &config.rate_limit);
        let gate = Arc::new(RequestGate::new(&config.gate, limiter));

        let state = AppState {
            catalog,
            verifier: Arc::new(SignatureVerifier::new(
                config.signature.secret.clone(),
                config.signature.max_age_secs,
            )),
            max_episode_number: config.signature.max_episode_number,
        };

        let router = Self::build_router(&config, state, gate);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers listed later wrap the earlier ones, so the request ID is set
    /// first and the gate runs last, right before routing.
    fn build_router(config: &AppConfig, state: AppState, gate: Arc<RequestGate>) -> Router {
        let mut router = Router::new()
            .route("/api/anime", get(handlers::list_anime))
            .route("/api/search", get(handlers::search_anime))
            .route("/api/anime/", get(handlers::anime_detail))
            .route("/api/anime/{*rest}", get(handlers::anime_detail))
            .route("/api/episode/", get(handlers::episode_links))
            .route("/api/episode/{*rest}", get(handlers::episode_links))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, gate_middleware))
            .layer(middleware::from_fn_with_state(
                Duration::from_secs(config.timeouts.request_secs),
                enforce_deadline,
            ))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn(track_request));

        for layer in security_header_layers() {
            router = router.layer(layer);
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record request count and latency by final status.
async fn track_request(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Requests still running past the deadline end as a generic internal error.
async fn enforce_deadline(
    State(deadline): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::Internal(format!("request exceeded {:?}", deadline)).into_response(),
    }
}

fn handle_panic(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiError::Internal("handler panicked".to_string()).into_response()
}
