//! Domain metrics for the ledger aggregator and the identity gateway.

use metrics::{counter, histogram};
use std::time::Duration;

/// Ledger aggregator metrics recorder
pub struct LedgerMetrics;

impl LedgerMetrics {
    /// A document whose summed field was missing or not an integer
    pub fn record_sum_skipped(collection: &str, field: &str) {
        counter!(
            "ledger_sum_skipped_total",
            "collection" => collection.to_string(),
            "field" => field.to_string()
        )
        .increment(1);
    }

    /// A completed joined listing
    pub fn record_join(collection: &str, records: usize, elapsed: Duration) {
        counter!("ledger_join_records_total", "collection" => collection.to_string())
            .increment(records as u64);
        histogram!("ledger_join_duration_seconds", "collection" => collection.to_string())
            .record(elapsed.as_secs_f64());

        tracing::debug!(
            collection = collection,
            records = records,
            elapsed_ms = elapsed.as_millis() as u64,
            "Joined collection"
        );
    }
}

/// Identity gateway metrics recorder
pub struct IdentityMetrics;

impl IdentityMetrics {
    /// One identity-provider call; `outcome` is `success` or `failure`
    pub fn record_operation(operation: &'static str, success: bool) {
        counter!(
            "identity_operations_total",
            "operation" => operation,
            "outcome" => outcome(success)
        )
        .increment(1);
    }

    pub fn record_reset_email(success: bool) {
        counter!("password_reset_emails_total", "outcome" => outcome(success)).increment(1);
    }
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        LedgerMetrics::record_sum_skipped("Expense", "e_amt");
        LedgerMetrics::record_join("Contribution", 3, Duration::from_millis(12));
        IdentityMetrics::record_operation("create_user", true);
        IdentityMetrics::record_reset_email(false);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(true), "success");
        assert_eq!(outcome(false), "failure");
    }
}
