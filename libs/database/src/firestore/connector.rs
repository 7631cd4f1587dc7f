use std::sync::Arc;
use tracing::info;

use super::{FirestoreClient, FirestoreConfig, GoogleCredentials};
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_if};
use crate::firestore::DocumentStore;

/// Build a Firestore client and verify it can reach the database,
/// retrying with exponential backoff.
///
/// Credential and configuration errors fail immediately; transport and
/// server errors are retried.
///
/// # Example
/// ```ignore
/// use database::firestore::{connect_with_retry, FirestoreConfig, GoogleCredentials};
///
/// let credentials = GoogleCredentials::emulator("demo");
/// let config = FirestoreConfig::new("demo").with_emulator_host("localhost:8081");
/// let store = connect_with_retry(&config, &credentials, reqwest::Client::new(), None).await?;
/// ```
pub async fn connect_with_retry(
    config: &FirestoreConfig,
    credentials: &GoogleCredentials,
    http: reqwest::Client,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<FirestoreClient> {
    let retry_config = retry_config.unwrap_or_default();

    info!(
        project = %config.project_id,
        database = %config.database,
        emulator = config.is_emulator(),
        "Connecting to Firestore"
    );

    retry_if(
        || connect_once(config, credentials, http.clone()),
        retry_config,
        is_transient,
    )
    .await
    .map_err(|e| match e {
        DatabaseError::ConnectionFailed(_) => e,
        other => DatabaseError::ConnectionFailed(other.to_string()),
    })
}

/// One attempt; keeps the underlying error kind for retry decisions
async fn connect_once(
    config: &FirestoreConfig,
    credentials: &GoogleCredentials,
    http: reqwest::Client,
) -> DatabaseResult<FirestoreClient> {
    let client = FirestoreClient::new(config, Arc::clone(&credentials.tokens), http);
    client.ping().await?;
    info!(project = %config.project_id, "Successfully connected to Firestore");
    Ok(client)
}

fn is_transient(error: &DatabaseError) -> bool {
    match error {
        DatabaseError::Http(_) | DatabaseError::ConnectionFailed(_) => true,
        DatabaseError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
