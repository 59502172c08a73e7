//! Metrics collection and exposition.
//!
//! # Metrics
//! - `status_api_requests_total` (counter): requests by method, status
//! - `status_api_request_duration_seconds` (histogram): latency by method, status
//! - `status_api_rate_limited_total` (counter): requests refused by the limiter
//! - `status_api_auth_failures_total` (counter): refused credentials by reason
//! - `status_api_untrusted_host_total` (counter): requests with an unknown Host
//! - `status_api_slow_requests_total` (counter): requests over the slow threshold
//! - `status_api_rate_limit_identifiers` (gauge): identifiers held by the limiter
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "status_api_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "status_api_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    metrics::counter!("status_api_rate_limited_total").increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!("status_api_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_untrusted_host() {
    metrics::counter!("status_api_untrusted_host_total").increment(1);
}

pub fn record_slow_request() {
    metrics::counter!("status_api_slow_requests_total").increment(1);
}

pub fn record_ledger_size(identifiers: usize) {
    metrics::gauge!("status_api_rate_limit_identifiers").set(identifiers as f64);
}
