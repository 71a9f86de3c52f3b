//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Adapters, nonce manager, RPC client produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Signer addresses, method names and tx hashes are logged as fields
//! - Private keys never reach a log event or a metric label
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

use crate::config::ObservabilityConfig;

/// Install logging and, when enabled, the Prometheus exporter.
///
/// Must run inside a Tokio runtime when metrics are enabled.
pub fn init(config: &ObservabilityConfig) {
    init_logging(config);
    if config.metrics_enabled {
        match config.metrics_address.parse() {
            Ok(addr) => self::metrics::init_metrics(addr),
            Err(e) => tracing::error!(address = %config.metrics_address, error = %e, "Invalid metrics address"),
        }
    }
}
