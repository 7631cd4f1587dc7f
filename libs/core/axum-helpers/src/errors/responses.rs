//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": "Internal server error",
        "errorMessage": "Firestore API error (503): backend unavailable"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request",
    content_type = "application/json",
    example = json!({
        "error": "Validation failed",
        "errorMessage": "email: must be a valid email address"
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Document not found",
    content_type = "application/json",
    example = json!({
        "error": "Document not found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);
