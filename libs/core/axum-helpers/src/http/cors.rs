use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Creates a CORS layer restricted to the given origins.
///
/// Allows the methods the gateway serves (GET, POST, PUT, OPTIONS), the
/// `Content-Type`, `Authorization` and `Accept` headers, and caches preflight
/// results for an hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer that allows any origin.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// The variable holds comma-separated origins, e.g.
/// `CORS_ALLOWED_ORIGIN=http://localhost:3000,https://app.example.com`.
/// When it is unset the layer is permissive, matching a browser client
/// served from any host.
///
/// # Errors
/// Returns `InvalidInput` when the variable is set but empty or contains a
/// value that is not a valid header.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let Ok(raw) = std::env::var("CORS_ALLOWED_ORIGIN") else {
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(create_permissive_cors_layer());
    };

    let origins = parse_origins(&raw)?;
    info!("CORS configured with allowed origins: {}", raw);
    Ok(create_cors_layer(origins))
}

fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(origins)
}
