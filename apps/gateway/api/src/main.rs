use axum_helpers::{cors_layer_from_env, server::create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Colored error reports must be installed before anything can fail
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    observability::init_metrics();

    // One pooled HTTP client for Firestore, Identity Toolkit and token exchange
    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let state = AppState::connect(&config, http).await?;

    let app = api::app(&state, config.app, cors_layer_from_env()?);

    info!(
        address = %config.server.address(),
        environment = ?config.environment,
        "Starting gateway API with graceful shutdown (30s timeout)"
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        // Firestore and Identity Toolkit are stateless HTTP; dropping the
        // state releases the pooled connections.
        drop(state);
        info!("Released upstream connections");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Gateway API shutdown complete");
    Ok(())
}
