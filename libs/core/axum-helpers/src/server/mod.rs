//! Server infrastructure: router assembly, health endpoints and graceful
//! shutdown.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(routes).await?.merge(health_router(app_info!()));
//! create_production_app(router, &ServerConfig::default(), Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{
    OPENAPI_PATH, create_app, create_production_app, create_router, create_router_with_cors,
};
pub use health::{
    HealthCheckFuture, HealthResponse, ReadyResponse, health_handler, health_router,
    run_health_checks,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
