//! Custom extractors for Axum handlers.
//!
//! Each one rejects with an [`AppError`](crate::errors::AppError) so every
//! failure renders as the shared `{error, errorMessage}` body.

pub mod json_object;
pub mod search_query;
pub mod validated_json;

pub use json_object::JsonObject;
pub use search_query::SearchQuery;
pub use validated_json::ValidatedJson;
