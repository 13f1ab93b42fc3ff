//! Search API routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::content::Status;
use crate::error::{AppError, Result};
use crate::search::{SearchHit, SearchIndex};
use crate::state::AppState;

const DEFAULT_LIMIT: i32 = 50;

/// Create the search router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search_content))
}

/// Search query parameters
#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    status: Option<String>,
    limit: Option<i32>,
}

/// Full-text search over indexed content, optionally filtered by
/// completeness facet
async fn search_content(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            Status::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status facet: {}", s)))
        })
        .transpose()?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 200);
    let hits = SearchIndex::new(state.db())
        .search(&query.q, status, limit)
        .await?;
    Ok(Json(hits))
}
