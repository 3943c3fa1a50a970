//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingest_requests_total` (counter): pipeline runs by outcome
//!   (`accepted`, `serialization`, `store_write`, `queue_publish`)
//! - `ingest_request_duration_seconds` (histogram): pipeline latency
//! - `ingest_in_flight` (gauge): requests currently in the pipeline
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished pipeline run.
pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("ingest_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("ingest_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn in_flight_changed(delta: f64) {
    metrics::gauge!("ingest_in_flight").increment(delta);
}
