use super::shutdown::{ShutdownCoordinator, shutdown_signal};
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Json, Router, middleware, routing::get};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Path the generated OpenAPI document is served from
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Starts the server and stops on Ctrl+C or SIGTERM.
///
/// # Errors
/// Fails if the listener cannot bind or the server errors while running.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Wraps the application routes with the shared cross-cutting layers.
///
/// - serves the OpenAPI document of `T` at [`OPENAPI_PATH`]
/// - mounts `apis` at the root
/// - JSON 404 and 405 fallbacks
/// - request tracing, security headers, CORS (see
///   [`cors_layer_from_env`]) and response compression
///
/// Routes in `apis` must already have their state applied.
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is set to an invalid value.
///
/// # Example
/// ```ignore
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let routes = Router::new()
///     .route("/example", get(handler))
///     .with_state(state);
///
/// let router = create_router::<ApiDoc>(routes).await?;
/// ```
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    Ok(create_router_with_cors::<T>(apis, cors_layer_from_env()?))
}

/// [`create_router`] with an explicit CORS layer
pub fn create_router_with_cors<T>(apis: Router, cors_layer: CorsLayer) -> Router
where
    T: OpenApi + 'static,
{
    let openapi = T::openapi();

    Router::new()
        .route(OPENAPI_PATH, get(move || async move { Json(openapi) }))
        .merge(apis)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new())
}

/// Serves `router` until shutdown, then runs `cleanup` bounded by
/// `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// create_production_app(router, &config, Duration::from_secs(30), async move {
///     info!("Flushing state");
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::default();
    let cleanup_signal = coordinator.clone();
    let serve_signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        cleanup_signal.wait_for_signal().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            ),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { serve_signal.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // A server error skips the signal; release the cleanup task anyway
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
