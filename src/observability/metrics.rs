//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mrp_requests_total` (counter): requests by method, route, status
//! - `mrp_request_duration_seconds` (histogram): dispatch latency
//! - `mrp_logins_total` (counter): login attempts by outcome
//! - `mrp_active_sessions` (gauge): sessions in the token store, sampled by
//!   the session sweeper
//!
//! Recording is a no-op until a recorder is installed, so unit tests and
//! embedders that skip [`init_metrics`] pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a dispatched request. `route` is the matched pattern or `"none"`.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("mrp_requests_total", &labels).increment(1);
    metrics::histogram!("mrp_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a login attempt outcome (`success` or `invalid`).
pub fn record_login(outcome: &'static str) {
    metrics::counter!("mrp_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_active_sessions(count: usize) {
    metrics::gauge!("mrp_active_sessions").set(count as f64);
}
