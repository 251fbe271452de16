//! Metrics collection and exposition.
//!
//! # Metrics
//! - `profview_requests_total` (counter): requests by route, status
//! - `profview_request_duration_seconds` (histogram): latency distribution
//! - `profview_snapshot_lookups_total` (counter): store lookups by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay low-cardinality; selectors and timestamps never become labels

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "profview_requests_total";
pub const REQUEST_DURATION: &str = "profview_request_duration_seconds";
pub const SNAPSHOT_LOOKUPS_TOTAL: &str = "profview_snapshot_lookups_total";

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    let status = status.to_string();
    ::metrics::counter!(REQUESTS_TOTAL, "route" => route, "status" => status.clone()).increment(1);
    ::metrics::histogram!(REQUEST_DURATION, "route" => route, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record a snapshot store lookup: "hit", "miss" or "error".
pub fn record_lookup(outcome: &'static str) {
    ::metrics::counter!(SNAPSHOT_LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
}
