//! Extractor for free-form JSON object bodies.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde_json::{Map, Value};

/// A request body that must be a JSON object; any other JSON value, or
/// invalid JSON, rejects with 400.
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;

        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::put};
    use tower::ServiceExt;

    async fn count(JsonObject(map): JsonObject) -> String {
        map.len().to_string()
    }

    async fn status_for(body: &str) -> StatusCode {
        Router::new()
            .route("/update", put(count))
            .oneshot(
                axum::http::Request::builder()
                    .method("PUT")
                    .uri("/update")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_object_is_accepted() {
        assert_eq!(status_for(r#"{"u_name":"Asha"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_object_is_rejected() {
        assert_eq!(status_for("[1,2]").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("\"text\"").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("{broken").await, StatusCode::BAD_REQUEST);
    }
}
