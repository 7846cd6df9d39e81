mod api;
mod config;
mod models;
mod spreadsheet;
mod store;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rod Chain FEA Service");
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    // Build application router
    let app = api::create_router(&config);

    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);
    tracing::info!("Max request body: {} bytes", config.max_upload_bytes);
    tracing::info!("Max chain size: {} nodes", config.max_nodes);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/v1/version");
    tracing::info!("  POST /api/v1/validate");
    tracing::info!("  POST /api/v1/displacements");
    tracing::info!("  POST /api/v1/analyze");
    tracing::info!("  POST /api/v1/sections");
    tracing::info!("  GET  /api/v1/template");
    tracing::info!("  POST /api/v1/projects");
    tracing::info!("  POST /api/v1/projects/upload");
    tracing::info!("  GET  /api/v1/projects/:id");
    tracing::info!("  PUT  /api/v1/projects/:id");
    tracing::info!("  POST /api/v1/projects/:id/analyze");
    tracing::info!("  GET  /api/v1/projects/:id/export");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
