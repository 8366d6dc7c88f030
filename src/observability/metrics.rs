//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_router_lookups_total` (counter): lookups by outcome
//! - `host_router_lookup_duration_seconds` (histogram): extraction + point read latency
//! - `host_router_requests_total` (counter): forwarded requests by decision, status
//! - `host_router_request_duration_seconds` (histogram): end-to-end latency
//!
//! Recording is a no-op until a recorder is installed by [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one host lookup.
pub fn record_lookup(outcome: &'static str, start: Instant) {
    counter!("host_router_lookups_total", "outcome" => outcome).increment(1);
    histogram!("host_router_lookup_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one routed request.
pub fn record_request(decision: &'static str, status: u16, start: Instant) {
    counter!(
        "host_router_requests_total",
        "decision" => decision,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("host_router_request_duration_seconds", "decision" => decision)
        .record(start.elapsed().as_secs_f64());
}
