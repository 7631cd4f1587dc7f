use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::common::DatabaseResult;

/// A document body: top-level field name to JSON value
pub type Document = Map<String, Value>;

/// A document together with its id, as returned by a collection scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Access to a collection-of-documents database.
///
/// Implementations must be safe to share across concurrent requests.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `None` when it does not exist
    async fn get(&self, collection: &str, id: &str) -> DatabaseResult<Option<Document>>;

    /// Create or fully replace a document
    async fn set(&self, collection: &str, id: &str, data: Document) -> DatabaseResult<()>;

    /// Overwrite only the given top-level fields of an existing document.
    ///
    /// Fails with `DatabaseError::NotFound` when the document is missing.
    async fn merge(&self, collection: &str, id: &str, fields: Document) -> DatabaseResult<()>;

    /// Delete a document; deleting a missing document is not an error
    async fn delete(&self, collection: &str, id: &str) -> DatabaseResult<()>;

    /// Scan a whole collection in the store's native order
    async fn list(&self, collection: &str) -> DatabaseResult<Vec<StoredDocument>>;

    /// Cheap round-trip used by readiness checks
    async fn ping(&self) -> DatabaseResult<()>;
}
