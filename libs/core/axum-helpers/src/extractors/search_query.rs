//! Extractor for the `?search_query=` parameter that addresses a single
//! document or account.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct Params {
    search_query: Option<String>,
}

/// The non-empty value of `search_query`; rejects with 400 when absent.
///
/// # Example
/// ```ignore
/// async fn fetch(SearchQuery(id): SearchQuery) -> String {
///     id
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery(pub String);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<Params>::from_request_parts(parts, state).await?;

        match params.search_query {
            Some(value) if !value.trim().is_empty() => Ok(SearchQuery(value)),
            _ => Err(AppError::BadRequest(
                "Missing search_query parameter".to_string(),
            )),
        }
    }
}
