/// Config and schema version endpoints

use crate::{
    api::{reject, AppState},
    migration::version::same_version,
    model::{Config, ConfigRecord},
    repository::Outcome,
};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use serde_json::{json, Value};

/// Schema version status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStatus {
    pub current: String,
    pub target: String,
    pub needs_migration: bool,
}

pub fn create_config_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/config",
            get(load_config).put(save_config).delete(delete_config),
        )
        .route("/api/version", get(version_status))
}

/// GET /api/config
async fn load_config(State(state): State<AppState>) -> Result<Json<Outcome<Config>>, StatusCode> {
    state
        .config
        .load()
        .await
        .map(Json)
        .map_err(|e| reject("Failed to load config", e))
}

/// PUT /api/config
/// Body: { "version", "tabs": [{ "id", "name", "items": [id | inline object] }] }
async fn save_config(
    State(state): State<AppState>,
    Json(config): Json<ConfigRecord>,
) -> Result<Json<ConfigRecord>, StatusCode> {
    state
        .config
        .save(config)
        .await
        .map(Json)
        .map_err(|e| reject("Failed to save config", e))
}

/// DELETE /api/config
/// Referenced folders and workflows are kept
async fn delete_config(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    state
        .config
        .delete()
        .await
        .map_err(|e| reject("Failed to delete config", e))?;

    Ok(Json(json!({ "message": "Config deleted" })))
}

/// GET /api/version
async fn version_status(State(state): State<AppState>) -> Json<VersionStatus> {
    let current = state.versions.get_current_version().await;
    let target = state.versions.target_version().to_string();

    Json(VersionStatus {
        needs_migration: !same_version(&current, &target),
        current,
        target,
    })
}
