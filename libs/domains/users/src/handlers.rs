use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use axum_helpers::{
    JsonObject, SearchQuery, ValidatedJson,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
};
use database::firestore::Document;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{CreateUser, LoginRequest, MessageResponse, UserProfile};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the account endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        login,
        reset_password,
        fetch_current_user,
        update_user_profile,
        delete_user_profile,
    ),
    components(
        schemas(CreateUser, LoginRequest, UserProfile, MessageResponse),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Registration, login and profile endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/createUser", post(create_user))
        .route("/login", post(login))
        .route("/resetPassword", post(reset_password))
        .route("/fetchCurrentUser", get(fetch_current_user))
        .route("/updateUserProfile", put(update_user_profile))
        .route("/deleteUserProfile", put(delete_user_profile))
        .with_state(shared_service)
}

/// Register an account and its profile; responds with the new uid
#[utoipa::path(
    post,
    path = "/createUser",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 200, description = "Uid of the new user", body = String, content_type = "text/plain"),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<String> {
    service.register(input).await
}

/// Check credentials; responds with the uid
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Uid of the signed-in user", body = String, content_type = "text/plain"),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<String> {
    service.authenticate(input).await
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/resetPassword",
    tag = TAG,
    params(("search_query" = String, Query, description = "Account email")),
    responses(
        (status = 200, description = "Reset email sent", body = MessageResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reset_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    SearchQuery(email): SearchQuery,
) -> UserResult<Json<MessageResponse>> {
    service.request_password_reset(&email).await?;
    Ok(Json(MessageResponse {
        message: "Password reset email sent successfully.".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/fetchCurrentUser",
    tag = TAG,
    params(("search_query" = String, Query, description = "Profile id")),
    responses(
        (status = 200, description = "Stored profile document", body = Object),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn fetch_current_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    SearchQuery(id): SearchQuery,
) -> UserResult<Json<Document>> {
    Ok(Json(service.fetch_profile(&id).await?))
}

/// Overwrite the supplied top-level fields of a profile
#[utoipa::path(
    put,
    path = "/updateUserProfile",
    tag = TAG,
    params(("search_query" = String, Query, description = "Profile id")),
    request_body(content = Object, description = "Fields to overwrite"),
    responses(
        (status = 200, description = "Profile updated", body = String, content_type = "text/plain"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    SearchQuery(id): SearchQuery,
    JsonObject(fields): JsonObject,
) -> UserResult<&'static str> {
    service.update_profile(&id, fields).await?;
    Ok("Document updated successfully")
}

/// Delete a profile and the identity behind it
#[utoipa::path(
    put,
    path = "/deleteUserProfile",
    tag = TAG,
    params(("search_query" = String, Query, description = "Profile id")),
    responses(
        (status = 200, description = "Profile and identity deleted", body = String, content_type = "text/plain"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    SearchQuery(id): SearchQuery,
) -> UserResult<&'static str> {
    service.delete_profile(&id).await?;
    Ok("Document and user deleted successfully")
}
