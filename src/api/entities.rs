/// CRUD endpoints for flat record kinds
///
/// Workflows, env vars and global vars share the same five routes, generated from one
/// set of generic handlers over `EntityRepository<T>`.

use crate::{
    api::{reject, AppState},
    context::StoreContext,
    model::{Entity, EnvVar, GlobalVar, Workflow},
    repository::{EntityRepository, Outcome},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};

/// A record kind exposed over HTTP, and where the context keeps its repository
pub trait Resource: Entity {
    fn repository(ctx: &StoreContext) -> &EntityRepository<Self>;
}

impl Resource for Workflow {
    fn repository(ctx: &StoreContext) -> &EntityRepository<Self> {
        &ctx.workflows
    }
}

impl Resource for EnvVar {
    fn repository(ctx: &StoreContext) -> &EntityRepository<Self> {
        &ctx.env_vars
    }
}

impl Resource for GlobalVar {
    fn repository(ctx: &StoreContext) -> &EntityRepository<Self> {
        &ctx.global_vars
    }
}

/// Routes for one record kind
///
/// `GET|POST {base}` and `GET|PUT|DELETE {base}/{id}`
pub fn create_entity_routes<T: Resource>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(list_entities::<T>).post(create_entity::<T>))
        .route(
            &format!("{}/{{id}}", base),
            get(get_entity::<T>)
                .put(update_entity::<T>)
                .delete(delete_entity::<T>),
        )
}

/// GET {base}
/// Returns: { "value": [...], "skipped": n }
async fn list_entities<T: Resource>(
    State(state): State<AppState>,
) -> Result<Json<Outcome<Vec<T>>>, StatusCode> {
    T::repository(&state)
        .find_all()
        .await
        .map(Json)
        .map_err(|e| reject("Failed to list records", e))
}

/// POST {base}
/// Body: the record; 409 when the id is already taken
async fn create_entity<T: Resource>(
    State(state): State<AppState>,
    Json(entity): Json<T>,
) -> Result<Json<T>, StatusCode> {
    let repository = T::repository(&state);

    if repository.exists(entity.id()).await {
        return Err(StatusCode::CONFLICT);
    }

    let saved = repository
        .save(entity)
        .await
        .map_err(|e| reject("Failed to create record", e))?;

    tracing::info!("🔥 Created {} '{}'", T::KIND, saved.id());
    Ok(Json(saved))
}

/// GET {base}/{id}
async fn get_entity<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, StatusCode> {
    T::repository(&state)
        .find_by_id(&id)
        .await
        .map(Json)
        .map_err(|e| reject("Failed to load record", e))
}

/// PUT {base}/{id}
/// Body: the full record; its id must match the URL
async fn update_entity<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entity): Json<T>,
) -> Result<Json<T>, StatusCode> {
    if entity.id() != id {
        return Err(StatusCode::BAD_REQUEST);
    }

    let repository = T::repository(&state);
    if !repository.exists(&id).await {
        return Err(StatusCode::NOT_FOUND);
    }

    let saved = repository
        .save(entity)
        .await
        .map_err(|e| reject("Failed to update record", e))?;

    tracing::info!("🔥 Updated {} '{}'", T::KIND, id);
    Ok(Json(saved))
}

/// DELETE {base}/{id}
async fn delete_entity<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    T::repository(&state)
        .delete(&id)
        .await
        .map_err(|e| reject("Failed to delete record", e))?;

    tracing::info!("Deleted {} '{}'", T::KIND, id);
    Ok(Json(json!({ "message": format!("{} '{}' deleted", T::KIND, id) })))
}
