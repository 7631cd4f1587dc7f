use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorResponse;
use database::DatabaseError;
use thiserror::Error;

use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum UserError {
    /// The identity provider refused the account, or the profile write
    /// after it failed
    #[error("{0}")]
    IdentityCreation(String),

    /// Password grant rejected; carries the provider's message
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    ResetLink(String),

    #[error("{0}")]
    EmailDelivery(String),

    #[error("Document not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => UserError::NotFound(id),
            other => UserError::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for UserError {
    fn from(err: IdentityError) -> Self {
        UserError::Internal(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            UserError::IdentityCreation(msg) => {
                tracing::error!("Error creating user: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_message("Error creating user", msg),
                )
            }
            UserError::Authentication(msg) => {
                tracing::info!("Error logging in user: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_message("Error logging in user", msg),
                )
            }
            UserError::ResetLink(msg) | UserError::EmailDelivery(msg) => {
                tracing::error!("Password reset failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
            UserError::NotFound(id) => {
                tracing::debug!(id = %id, "Profile not found");
                (StatusCode::NOT_FOUND, ErrorResponse::new("Document not found"))
            }
            UserError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("Validation failed", msg),
            ),
            UserError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
        };

        body.into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_not_found_maps_to_not_found() {
        let err: UserError = DatabaseError::not_found("Users", "abc").into();
        assert!(matches!(err, UserError::NotFound(id) if id == "abc"));
    }

    #[test]
    fn test_database_failure_maps_to_internal() {
        let err: UserError = DatabaseError::ConnectionFailed("refused".into()).into();
        assert!(matches!(err, UserError::Internal(_)));
    }

    #[test]
    fn test_statuses() {
        assert_eq!(
            UserError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            UserError::Validation("email".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UserError::Authentication("INVALID_PASSWORD".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
