/// HTTP API Layer
///
/// REST endpoints over the store context:
/// - Workflow, env var and global var CRUD
/// - Folder trees (materialize, save with children, delete with children)
/// - Config load/save/delete and schema version status

// Generic CRUD endpoints for flat record kinds
pub mod entities;

// Folder tree endpoints
pub mod folders;

// Config and version endpoints
pub mod config;

use crate::context::StoreContext;
use crate::error::StoreError;
use axum::http::StatusCode;
use std::sync::Arc;

pub use config::create_config_routes;
pub use entities::create_entity_routes;
pub use folders::create_folder_routes;

/// Shared application state: the single store context
pub type AppState = Arc<StoreContext>;

/// Map a store error onto an HTTP status, logging server-side failures
pub(crate) fn reject(action: &str, err: StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => {
            tracing::debug!("{}: {}", action, err);
            StatusCode::NOT_FOUND
        }
        StoreError::Validation(_) => {
            tracing::warn!("❌ {}: {}", action, err);
            StatusCode::BAD_REQUEST
        }
        StoreError::Storage { .. } | StoreError::Migration { .. } => {
            tracing::error!("❌ {}: {}", action, err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
