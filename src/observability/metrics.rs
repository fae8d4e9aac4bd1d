//! Metrics collection and exposition.
//!
//! # Metrics
//! - `catalog_requests_total` (counter): requests by method, status
//! - `catalog_request_duration_seconds` (histogram): latency distribution
//! - `catalog_gate_denied_total` (counter): gate denials by reason
//! - `catalog_rate_limited_total` (counter): rate-limit rejections
//! - `catalog_sync_upserts_total` (counter): sync upserts by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "catalog_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("catalog_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_denied(reason: &'static str) {
    metrics::counter!("catalog_gate_denied_total", "reason" => reason).increment(1);
}

pub fn record_rate_limited() {
    metrics::counter!("catalog_rate_limited_total").increment(1);
}

pub fn record_sync_upsert(outcome: &'static str) {
    metrics::counter!("catalog_sync_upserts_total", "outcome" => outcome).increment(1);
}
