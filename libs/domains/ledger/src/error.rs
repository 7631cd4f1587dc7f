use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorResponse;
use database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A scan or lookup against the document store failed
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Ledger read failed");
        ErrorResponse::new(self.to_string()).into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_500() {
        let err = LedgerError::from(DatabaseError::Api {
            status: 503,
            message: "backend unavailable".into(),
        });
        assert_eq!(
            err.to_string(),
            "Firestore API error (503): backend unavailable"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
