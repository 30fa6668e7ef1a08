//! Metrics collection and exposition.
//!
//! # Metrics
//! - `policy_executions_total` (counter): executions by policy, outcome
//! - `policy_execution_duration_seconds` (histogram): per-policy latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one policy execution.
pub fn record_policy_execution(policy: &'static str, success: bool, start: Instant) {
    let outcome = if success { "success" } else { "failure" };

    counter!("policy_executions_total", "policy" => policy, "outcome" => outcome).increment(1);
    histogram!("policy_execution_duration_seconds", "policy" => policy)
        .record(start.elapsed().as_secs_f64());
}
