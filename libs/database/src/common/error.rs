/// Unified error type for all document-store operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Transport-level failure talking to the REST endpoint
    #[cfg(feature = "firestore")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Firestore API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A write that requires an existing document found none
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A document could not be converted between JSON and the wire format
    #[error("Codec error: {0}")]
    Codec(String),

    /// Service-account key or token exchange failure
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
