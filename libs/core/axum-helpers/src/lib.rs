//! # Axum Helpers
//!
//! Shared plumbing for the gateway's HTTP surface.
//!
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: the `{error, errorMessage}` body and [`AppError`]
//! - **[`extractors`]**: validated JSON, JSON-object bodies, `?search_query=`
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let router = create_router::<ApiDoc>(Router::new()).await?;
//!     create_app(router, &ServerConfig::default()).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, OPENAPI_PATH, ReadyResponse, ShutdownCoordinator,
    create_app, create_production_app, create_router, create_router_with_cors, health_router,
    run_health_checks, shutdown_signal,
};

pub use http::{
    cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, security_headers,
};

pub use errors::{AppError, AppResult, ErrorResponse};

pub use extractors::{JsonObject, SearchQuery, ValidatedJson};
