use axum::{Router, middleware, routing::get};
use axum_helpers::server::{create_router_with_cors, health_router};
use core_config::AppInfo;
use observability::{metrics_handler, metrics_middleware};
use tower_http::cors::CorsLayer;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod health;
pub mod ledger;
pub mod users;

/// Domain routes, mounted at the root.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(users::router(state))
        .merge(ledger::router(state))
}

async fn root() -> &'static str {
    "Hello World"
}

/// `/ready` with its own state; merges into the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete application: domain routes, OpenAPI document, health,
/// readiness, Prometheus metrics and the shared middleware stack.
pub fn app(state: &AppState, info: AppInfo, cors: CorsLayer) -> Router {
    create_router_with_cors::<ApiDoc>(routes(state), cors)
        .merge(health_router(info))
        .merge(ready_router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
}
