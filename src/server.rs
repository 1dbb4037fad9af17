/// Server setup and initialization
///
/// Opens the store, brings its schema up to date and mounts the REST routes.
/// Startup stops if the migration run fails.

use crate::{
    api::{create_config_routes, create_entity_routes, create_folder_routes, AppState},
    config::Config,
    context::StoreContext,
    model::{EnvVar, GlobalVar, Workflow},
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build the router over an already initialized context
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Record CRUD
        .merge(create_entity_routes::<Workflow>("/api/workflows"))
        .merge(create_entity_routes::<EnvVar>("/api/env-vars"))
        .merge(create_entity_routes::<GlobalVar>("/api/global-vars"))
        // Trees, config and version
        .merge(create_folder_routes())
        .merge(create_config_routes())
        .with_state(state)
}

/// Open the store, run migrations and return the application router
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🏗️ Opening store ({:?} backend)", config.storage.backend);
    let context = StoreContext::open(&config.storage).await?;

    tracing::info!("🔄 Checking schema version");
    let report = context
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate stored data: {}", e))?;
    tracing::info!(
        "📋 Schema at {} (was {}, {} migrations applied)",
        report.to,
        report.from,
        report.applied
    );

    let app = create_router(Arc::new(context));
    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting flowstash server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
