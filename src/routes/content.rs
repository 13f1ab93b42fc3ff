//! Content item API routes
//!
//! Thin CRUD glue over the repositories; every mutation ends with a
//! best-effort resync of the derived stores through the syncer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::content::{
    Category, ContentItem, CreateItem, CreateSubRecord, DetailView, FieldUpdate,
};
use crate::db::{ItemRepository, SubRecordRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::sync::DetailAssembler;

/// Create the content router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:category", post(create_item).get(list_items))
        .route(
            "/:category/:id",
            get(get_detail).patch(update_field).delete(delete_item),
        )
        .route("/:category/:id/records", post(add_sub_record))
        .route(
            "/:category/:id/records/:record_id",
            delete(remove_sub_record),
        )
}

/// Load an item and check it belongs to the addressed category
async fn load_item(state: &AppState, category: Category, id: &str) -> Result<ContentItem> {
    let item = ItemRepository::new(state.db())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item not found: {}", id)))?;

    if item.category() != category {
        return Err(AppError::NotFound(format!(
            "Item not found in {}: {}",
            category.as_str(),
            id
        )));
    }
    Ok(item)
}

/// Create a content item
async fn create_item(
    State(state): State<AppState>,
    Path(category): Path<Category>,
    Json(data): Json<CreateItem>,
) -> Result<(StatusCode, Json<DetailView>)> {
    if data.kind.category() != category {
        return Err(AppError::BadRequest(format!(
            "kind {} does not belong to category {}",
            data.kind.as_str(),
            category.as_str()
        )));
    }

    let item = ItemRepository::new(state.db()).create(data).await?;
    let view = state.syncer().sync_after_mutation(&item.id, category).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// List items in a category (metadata only, newest first)
async fn list_items(
    State(state): State<AppState>,
    Path(category): Path<Category>,
) -> Result<Json<Vec<ContentItem>>> {
    let items = ItemRepository::new(state.db()).list(category).await?;
    Ok(Json(items))
}

/// Get the assembled detail for an item, cache first
async fn get_detail(
    State(state): State<AppState>,
    Path((category, id)): Path<(Category, String)>,
) -> Result<Json<DetailView>> {
    let item = load_item(&state, category, &id).await?;

    if let Some(view) = state.syncer().cached_view(category, &id, item.version).await {
        return Ok(Json(view));
    }

    let view = DetailAssembler::new(state.db()).assemble(&id).await?;
    Ok(Json(view))
}

/// Apply a single-field update, bumping the item version
async fn update_field(
    State(state): State<AppState>,
    Path((category, id)): Path<(Category, String)>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<DetailView>> {
    let item = load_item(&state, category, &id).await?;

    let updated = crate::content::update::apply(&item, &update)?;
    ItemRepository::new(state.db()).persist(&updated).await?;

    let view = state.syncer().sync_after_mutation(&id, category).await?;
    Ok(Json(view))
}

/// Delete an item, its sub-records, cache entries, and search document
async fn delete_item(
    State(state): State<AppState>,
    Path((category, id)): Path<(Category, String)>,
) -> Result<StatusCode> {
    load_item(&state, category, &id).await?;

    ItemRepository::new(state.db()).delete(&id).await?;
    state.syncer().purge_after_delete(&id, category).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a sub-record under an item
///
/// Does not bump the parent version; the resync is keyed off the parent
/// id so cache and search still pick up the change.
async fn add_sub_record(
    State(state): State<AppState>,
    Path((category, id)): Path<(Category, String)>,
    Json(data): Json<CreateSubRecord>,
) -> Result<(StatusCode, Json<DetailView>)> {
    let item = load_item(&state, category, &id).await?;

    SubRecordRepository::new(state.db()).insert(&item, &data).await?;
    let view = state.syncer().sync_after_mutation(&id, category).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Remove a sub-record from an item
async fn remove_sub_record(
    State(state): State<AppState>,
    Path((category, id, record_id)): Path<(Category, String, String)>,
) -> Result<Json<DetailView>> {
    let item = load_item(&state, category, &id).await?;

    let removed = SubRecordRepository::new(state.db())
        .delete(&item, &record_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "Sub-record not found: {}",
            record_id
        )));
    }

    let view = state.syncer().sync_after_mutation(&id, category).await?;
    Ok(Json(view))
}
