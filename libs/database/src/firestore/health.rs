use serde::Serialize;
use std::time::Instant;

use super::DocumentStore;

/// Health check status for the document store
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Check store health, with timing and any error message
pub async fn check_health_detailed(store: &dyn DocumentStore) -> HealthStatus {
    let start = Instant::now();
    let result = store.ping().await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DatabaseError;
    use crate::firestore::{InMemoryDocumentStore, MockDocumentStore};

    #[tokio::test]
    async fn test_in_memory_store_is_healthy() {
        let store = InMemoryDocumentStore::new();
        let status = check_health_detailed(&store).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }

    #[tokio::test]
    async fn test_failed_ping_reports_message() {
        let mut store = MockDocumentStore::new();
        store.expect_ping().returning(|| {
            Err(DatabaseError::Api {
                status: 503,
                message: "backend unavailable".into(),
            })
        });

        let status = check_health_detailed(&store).await;
        assert!(!status.healthy);
        assert!(status.message.unwrap().contains("backend unavailable"));
    }
}
