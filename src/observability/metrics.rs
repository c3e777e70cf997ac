//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mockgate_requests_total` (counter): requests by method, status, mode
//! - `mockgate_request_duration_seconds` (histogram): latency distribution
//!
//! `mode` distinguishes gateway, mock and mock2 traffic.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => tracing::error!(%error, "Failed to install metrics exporter"),
    }
}

/// Record one terminal request outcome.
pub fn record_request(method: &str, status: u16, mode: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("mode", mode.to_string()),
    ];
    metrics::counter!("mockgate_requests_total", &labels).increment(1);
    metrics::histogram!("mockgate_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
