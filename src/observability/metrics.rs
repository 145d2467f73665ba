//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_admission_denied_total` (counter): 429s issued
//! - `gateway_uploads_total` / `gateway_upload_bytes_total` (counters): stored files
//! - `gateway_uploads_rejected_total` (counter): validation failures by reason
//! - `gateway_uploads_deleted_total` (counter): removed files
//!
//! # Design Decisions
//! - Prometheus exposition on its own listener, separate from the API port
//! - Recording is a no-op until the exporter is installed, so unit tests
//!   need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_admission_denied() {
    counter!("gateway_admission_denied_total").increment(1);
}

pub fn record_upload(category: &'static str, bytes: u64) {
    counter!("gateway_uploads_total", "category" => category).increment(1);
    counter!("gateway_upload_bytes_total", "category" => category).increment(bytes);
}

pub fn record_upload_rejected(reason: &'static str) {
    counter!("gateway_uploads_rejected_total", "reason" => reason).increment(1);
}

pub fn record_upload_deleted(category: &'static str) {
    counter!("gateway_uploads_deleted_total", "category" => category).increment(1);
}
