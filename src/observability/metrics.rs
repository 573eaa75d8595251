//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fitness_requests_total` (counter): requests by method, status
//! - `fitness_request_duration_seconds` (histogram): latency distribution
//! - `fitness_records` (gauge): records currently held in memory
//! - `fitness_storage_writes_total` (counter): writes by backend, outcome
//! - `fitness_reloads_total` (counter): store reloads by outcome
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests call these freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "fitness_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("fitness_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_store_size(records: usize) {
    gauge!("fitness_records").set(records as f64);
}

pub fn record_storage_write(backend: &'static str, ok: bool) {
    counter!(
        "fitness_storage_writes_total",
        "backend" => backend,
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_reload(ok: bool) {
    counter!("fitness_reloads_total", "outcome" => outcome(ok)).increment(1);
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}
