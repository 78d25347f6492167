//! Server entry point.
//!
//! Loads configuration from the environment (and `.env`), builds the
//! predictor and router, and serves on `HEARTSENSE_HOST:HEARTSENSE_PORT`.

use std::sync::Arc;

use anyhow::Result;
use heartsense_config::ServerConfig;
use heartsense_model::predictor_from_config;
use heartsense_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env()?;
    let predictor = predictor_from_config(&config);
    let state = Arc::new(AppState::new(predictor).with_body_limit(config.body_limit));
    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
