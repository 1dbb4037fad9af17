/// Folder tree endpoints

use crate::{
    api::{reject, AppState},
    model::{Folder, FolderRecord},
    repository::{DeleteReport, Outcome},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

pub fn create_folder_routes() -> Router<AppState> {
    Router::new()
        .route("/api/folders", get(list_folders).post(save_folder))
        .route("/api/folders/{id}", get(get_folder).delete(delete_folder))
}

/// GET /api/folders
/// Returns persisted records (items as ids)
async fn list_folders(
    State(state): State<AppState>,
) -> Result<Json<Outcome<Vec<FolderRecord>>>, StatusCode> {
    state
        .folders
        .find_all()
        .await
        .map(Json)
        .map_err(|e| reject("Failed to list folders", e))
}

/// POST /api/folders
/// Body: folder whose items may be ids or inline folders/workflows
async fn save_folder(
    State(state): State<AppState>,
    Json(folder): Json<FolderRecord>,
) -> Result<Json<FolderRecord>, StatusCode> {
    let saved = state
        .folders
        .save_with_children(folder)
        .await
        .map_err(|e| reject("Failed to save folder", e))?;

    tracing::info!("🔥 Saved folder '{}' ({} items)", saved.id, saved.items.len());
    Ok(Json(saved))
}

/// GET /api/folders/{id}
/// Returns the materialized tree
async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Outcome<Folder>>, StatusCode> {
    state
        .folders
        .find_by_id_with_children(&id)
        .await
        .map(Json)
        .map_err(|e| reject("Failed to load folder", e))
}

/// DELETE /api/folders/{id}
/// Deletes the folder and its whole subtree
async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteReport>, StatusCode> {
    state
        .folders
        .delete_with_children(&id)
        .await
        .map(Json)
        .map_err(|e| reject("Failed to delete folder", e))
}
