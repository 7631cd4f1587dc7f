use async_trait::async_trait;
use database::firestore::{Document, DocumentStore};
use std::sync::Arc;

use crate::error::UserResult;
use crate::models::USERS_COLLECTION;

/// Repository trait for profile persistence
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: &str) -> UserResult<Option<Document>>;

    /// Create or overwrite the whole profile
    async fn put(&self, id: &str, profile: Document) -> UserResult<()>;

    /// Overwrite only the given top-level fields; NotFound if absent
    async fn merge(&self, id: &str, fields: Document) -> UserResult<()>;

    async fn delete(&self, id: &str) -> UserResult<()>;
}

/// Profiles kept in the `Users` collection of a [`DocumentStore`]
#[derive(Clone)]
pub struct DocumentUserRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for DocumentUserRepository {
    async fn get(&self, id: &str) -> UserResult<Option<Document>> {
        Ok(self.store.get(USERS_COLLECTION, id).await?)
    }

    async fn put(&self, id: &str, profile: Document) -> UserResult<()> {
        self.store.set(USERS_COLLECTION, id, profile).await?;
        tracing::debug!(id = %id, "Stored profile");
        Ok(())
    }

    async fn merge(&self, id: &str, fields: Document) -> UserResult<()> {
        Ok(self.store.merge(USERS_COLLECTION, id, fields).await?)
    }

    async fn delete(&self, id: &str) -> UserResult<()> {
        Ok(self.store.delete(USERS_COLLECTION, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use database::firestore::InMemoryDocumentStore;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_put_get_merge_delete() {
        let store = InMemoryDocumentStore::new();
        let repo = DocumentUserRepository::new(Arc::new(store.clone()));

        repo.put("u1", doc(json!({"u_name": "Asha", "number": "1"})))
            .await
            .unwrap();
        repo.merge("u1", doc(json!({"number": "2"}))).await.unwrap();

        let stored = repo.get("u1").await.unwrap().unwrap();
        assert_eq!(stored["u_name"], "Asha");
        assert_eq!(stored["number"], "2");
        assert_eq!(store.count(USERS_COLLECTION).await, 1);

        repo.delete("u1").await.unwrap();
        assert!(repo.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_missing_is_not_found() {
        let repo = DocumentUserRepository::new(Arc::new(InMemoryDocumentStore::new()));
        let result = repo.merge("ghost", doc(json!({"number": "2"}))).await;
        assert!(matches!(result, Err(UserError::NotFound(id)) if id == "ghost"));
    }
}
