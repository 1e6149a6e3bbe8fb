//! Metrics collection and exposition.
//!
//! # Metrics
//! - `maintenance_requests_total` (counter): requests by outcome
//!   (`maintenance` or the bypass rule that fired)
//! - `maintenance_file_reloads_total` (counter): file cache reloads by result
//! - `maintenance_upstream_failures_total` (counter): maintenance service
//!   failures by kind
//!
//! Recording is a no-op until a recorder is installed, so the library can be
//! used without an exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one dispatched request.
pub fn record_request(outcome: &'static str) {
    metrics::counter!("maintenance_requests_total", "outcome" => outcome).increment(1);
}

/// Count a file cache reload attempt that did real work or failed.
pub fn record_file_reload(result: &'static str) {
    metrics::counter!("maintenance_file_reloads_total", "result" => result).increment(1);
}

/// Count a failed round trip to the maintenance service.
pub fn record_upstream_failure(kind: &'static str) {
    metrics::counter!("maintenance_upstream_failures_total", "kind" => kind).increment(1);
}
