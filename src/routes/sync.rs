//! Delta sync API routes

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::content::{Category, DetailView};
use crate::error::Result;
use crate::state::AppState;
use crate::sync::{DeltaSyncRequest, DeltaSyncResolver};

/// Create the sync router
pub fn router() -> Router<AppState> {
    Router::new().route("/:category", post(resolve_delta))
}

/// Resolve a batch of client-reported versions
///
/// Returns the full detail view for every item strictly newer than
/// reported; an up-to-date client gets an empty list.
async fn resolve_delta(
    State(state): State<AppState>,
    Path(category): Path<Category>,
    Json(request): Json<DeltaSyncRequest>,
) -> Result<Json<Vec<DetailView>>> {
    let resolver = DeltaSyncResolver::new(state.syncer());
    let views = resolver.resolve(category, &request.pairs).await?;
    Ok(Json(views))
}
