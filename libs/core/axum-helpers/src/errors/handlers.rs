use axum::{http::StatusCode, response::Response};

use super::ErrorResponse;

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    ErrorResponse::new("Route not found").into_response_with(StatusCode::NOT_FOUND)
}

/// Fallback for known routes hit with the wrong method
pub async fn method_not_allowed() -> Response {
    ErrorResponse::new("Method not allowed").into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}
