use axum::extract::State;
use axum::Json;

use super::schemas::{SearchRequest, SearchResponse};
use super::AppState;
use crate::error::ServerError;

/// `POST /search`: proxy a free-text query to the search backend and
/// return `[title, link, thumbnail]` triples.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ServerError> {
    let query = req
        .query_user
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ServerError::InvalidInput("No search query provided".to_owned()))?;

    let hits = state.search.search(query, state.search_limit).await?;
    state.metrics.increment_searches_completed();

    let output = hits
        .into_iter()
        .map(|hit| (hit.title, hit.link, hit.thumbnail))
        .collect();

    Ok(Json(SearchResponse { output }))
}
