//! Readiness checks against the document store and the mail relay.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::firestore::check_health_detailed;
use tracing::debug;

/// `GET /ready`: 200 when Firestore answers and the mail relay accepts a
/// connection, 503 otherwise.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "firestore",
            Box::pin(async {
                let status = check_health_detailed(state.store.as_ref()).await;
                debug!(elapsed_ms = status.response_time_ms, "Firestore ping");
                if status.healthy {
                    Ok(())
                } else {
                    Err(format!(
                        "Firestore ping failed: {}",
                        status.message.unwrap_or_default()
                    ))
                }
            }),
        ),
        (
            "smtp",
            Box::pin(async {
                state
                    .notifications
                    .health_check()
                    .await
                    .map_err(|e| format!("{:#}", e))
            }),
        ),
    ];

    run_health_checks(checks).await.into_response()
}
