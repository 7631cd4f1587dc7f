use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Gateway API",
        version = "0.1.0",
        description = "Account management over Firebase Auth and read-only ledger reports over Firestore"
    )
)]
struct GatewayDoc;

/// Combined document: both domains are mounted at the root, so their
/// paths merge instead of nesting under a prefix.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = GatewayDoc::openapi();
        doc.merge(domain_users::handlers::ApiDoc::openapi());
        doc.merge(domain_ledger::handlers::ApiDoc::openapi());
        doc
    }
}
