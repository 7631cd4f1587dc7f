use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{Document, DocumentStore, StoredDocument};
use crate::common::{DatabaseError, DatabaseResult};

type Collection = BTreeMap<String, Document>;

/// In-memory [`DocumentStore`] for development and tests.
///
/// Collections iterate in document-id order, which is also the order a
/// Firestore collection scan returns.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> DatabaseResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> DatabaseResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> DatabaseResult<()> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DatabaseError::not_found(collection, id))?;

        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DatabaseResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> DatabaseResult<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> DatabaseResult<()> {
        Ok(())
    }
}
