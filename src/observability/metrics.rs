//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mount_decode_total` (counter): decoded requests by `outcome`
//! - `mount_encode_total` (counter): encoded targets by `outcome`
//! - `page_expired_total` (counter): callbacks into pages no longer stored
//! - `hybrid_redirect_total` (counter): redirects to hybrid URLs
//! - `page_store_size` (gauge): pages currently stored
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Outcome labels come from a fixed set, never from request data

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Outcome of a decode: `ok`, `no_mount` or an error kind label.
pub fn record_decode(outcome: &'static str) {
    metrics::counter!("mount_decode_total", "outcome" => outcome).increment(1);
}

/// Outcome of an encode: `ok`, `no_mount` or an error kind label.
pub fn record_encode(outcome: &'static str) {
    metrics::counter!("mount_encode_total", "outcome" => outcome).increment(1);
}

pub fn record_page_expired() {
    metrics::counter!("page_expired_total").increment(1);
}

pub fn record_hybrid_redirect() {
    metrics::counter!("hybrid_redirect_total").increment(1);
}

pub fn record_page_store_size(size: usize) {
    metrics::gauge!("page_store_size").set(size as f64);
}
