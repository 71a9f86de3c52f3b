//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by role, action, outcome
//! - `dispatch_duration_seconds` (histogram): end-to-end dispatch latency
//! - `rpc_timeouts_total` (counter): expired RPC deadlines by operation
//! - `nonce_current` (gauge): last committed nonce per signer

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished dispatch.
pub fn record_dispatch(role: &str, action: &str, success: bool, elapsed: Duration) {
    let outcome = if success { "ok" } else { "error" };
    counter!(
        "dispatch_requests_total",
        "role" => role.to_string(),
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("dispatch_duration_seconds", "action" => action.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record an RPC round trip that hit its deadline.
pub fn record_rpc_timeout(operation: &'static str) {
    counter!("rpc_timeouts_total", "operation" => operation).increment(1);
}

/// Record the nonce a signer will use next.
pub fn record_nonce(signer: &str, next: u64) {
    gauge!("nonce_current", "signer" => signer.to_string()).set(next as f64);
}
