pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error body returned by every endpoint.
///
/// `error` is a short human-readable summary; `errorMessage` carries the
/// underlying cause when there is one worth showing.
///
/// ```json
/// { "error": "Error creating user", "errorMessage": "EMAIL_EXISTS" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_message: Some(message.into()),
        }
    }

    /// Pair this body with a status code
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Framework-level failures shared by every router: bad bodies, missing
/// query parameters, validation, and catch-all server errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!("JSON extraction error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_message("Invalid request body", e.body_text()),
                )
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!("Query extraction error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_message("Invalid query string", e.body_text()),
                )
            }
            AppError::ValidationError(e) => {
                tracing::info!("Validation error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_message("Validation failed", describe_validation(&e)),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
            }
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorResponse::new(msg))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_message("Internal server error", msg),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::with_message("Service unavailable", msg),
                )
            }
        };

        body.into_response_with(status)
    }
}

/// Flatten validator output into `field: message; field: message`
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

pub type AppResult<T> = Result<T, AppError>;
