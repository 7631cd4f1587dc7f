//! Observability utilities for the gateway.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Domain metrics for the ledger aggregator and identity gateway
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, LedgerMetrics};
//!
//! init_metrics();
//!
//! LedgerMetrics::record_sum_skipped("Expense", "e_amt");
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

pub mod gateway;
pub mod middleware;

pub use gateway::{IdentityMetrics, LedgerMetrics};
pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process.
///
/// Returns `None` when another recorder is already installed; metrics are
/// then routed to that recorder and `/metrics` reports them as unavailable.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle);
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            Some(METRICS_HANDLE.get_or_init(|| handle))
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Installed handle, if [`init_metrics`] succeeded
fn metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Ledger metrics
    describe_counter!(
        "ledger_sum_skipped_total",
        "Documents skipped by a field sum because the value was not an integer"
    );
    describe_histogram!(
        "ledger_join_duration_seconds",
        "Duration of a joined collection listing"
    );
    describe_counter!(
        "ledger_join_records_total",
        "Records produced by joined collection listings"
    );

    // Identity metrics
    describe_counter!(
        "identity_operations_total",
        "Identity provider calls by operation and outcome"
    );
    describe_counter!(
        "password_reset_emails_total",
        "Password reset emails by outcome"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_without_recorder() {
        if metrics_handle().is_none() {
            assert_eq!(metrics_handler().await, "# Metrics not initialized\n");
        }
    }
}
