use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::config::FirestoreConfig;
use super::credentials::TokenSource;
use super::store::{Document, DocumentStore, StoredDocument};
use super::value::{FirestoreValue, decode_fields, encode_fields};
use crate::common::{DatabaseError, DatabaseResult};

/// A document as the REST API returns it
#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>,
}

impl RestDocument {
    /// The last path segment of `projects/.../documents/{collection}/{id}`
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RestDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// [`DocumentStore`] backed by the Firestore REST v1 API
#[derive(Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: String,
    page_size: u32,
    timeout: Duration,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("documents_url", &self.documents_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl FirestoreClient {
    pub fn new(config: &FirestoreConfig, tokens: Arc<dyn TokenSource>, http: reqwest::Client) -> Self {
        Self {
            http,
            documents_url: config.documents_url(),
            page_size: config.page_size,
            timeout: Duration::from_secs(config.timeout_secs),
            tokens,
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url,
            urlencoding::encode(collection),
            urlencoding::encode(id)
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, urlencoding::encode(collection))
    }

    async fn request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> DatabaseResult<reqwest::RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .timeout(self.timeout))
    }
}

/// Turn a non-success response into [`DatabaseError::Api`]
async fn ensure_success(response: Response) -> DatabaseResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|parsed| parsed.error.message)
        .unwrap_or(body);

    Err(DatabaseError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Field paths outside `[A-Za-z_][A-Za-z0-9_]*` must be backtick-quoted
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> DatabaseResult<Option<Document>> {
        let response = self
            .request(reqwest::Method::GET, &self.document_url(collection, id))
            .await?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: RestDocument = ensure_success(response).await?.json().await?;
        decode_fields(document.fields).map(Some)
    }

    #[instrument(skip(self, data))]
    async fn set(&self, collection: &str, id: &str, data: Document) -> DatabaseResult<()> {
        let body = json!({ "fields": encode_fields(&data) });
        let response = self
            .request(reqwest::Method::PATCH, &self.document_url(collection, id))
            .await?
            .json(&body)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn merge(&self, collection: &str, id: &str, fields: Document) -> DatabaseResult<()> {
        // An empty update mask would replace the whole document
        if fields.is_empty() {
            return match self.get(collection, id).await? {
                Some(_) => Ok(()),
                None => Err(DatabaseError::not_found(collection, id)),
            };
        }

        let mut query: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(reqwest::Method::PATCH, &self.document_url(collection, id))
            .await?
            .query(&query)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DatabaseError::not_found(collection, id));
        }

        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> DatabaseResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &self.document_url(collection, id))
            .await?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> DatabaseResult<Vec<StoredDocument>> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", self.page_size.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .request(reqwest::Method::GET, &url)
                .await?
                .query(&query)
                .send()
                .await?;
            let page: ListResponse = ensure_success(response).await?.json().await?;

            for document in page.documents {
                let id = document.id().to_string();
                documents.push(StoredDocument::new(id, decode_fields(document.fields)?));
            }

            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        debug!(count = documents.len(), "Scanned collection");
        Ok(documents)
    }

    async fn ping(&self) -> DatabaseResult<()> {
        let url = format!("{}:listCollectionIds", self.documents_url);
        let response = self
            .request(reqwest::Method::POST, &url)
            .await?
            .json(&json!({ "pageSize": 1 }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::credentials::StaticTokenSource;

    fn client() -> FirestoreClient {
        FirestoreClient::new(
            &FirestoreConfig::new("demo").with_emulator_host("localhost:8081"),
            Arc::new(StaticTokenSource::new("owner")),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_document_url_encodes_ids() {
        assert_eq!(
            client().document_url("Users", "a b/c"),
            "http://localhost:8081/v1/projects/demo/databases/(default)/documents/Users/a%20b%2Fc"
        );
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("u_name"), "u_name");
        assert_eq!(field_path("_private"), "_private");
        assert_eq!(field_path("2fa"), "`2fa`");
        assert_eq!(field_path("first-name"), "`first-name`");
        assert_eq!(field_path("we`ird"), "`we\\`ird`");
    }

    #[test]
    fn test_rest_document_id_from_name() {
        let document: RestDocument = serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/Room/r42",
            "createTime": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(document.id(), "r42");
        assert!(document.fields.is_empty());
    }

    #[test]
    fn test_list_response_without_documents() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
