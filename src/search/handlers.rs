use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::{info, instrument, warn};

use super::types::{SearchQuery, SearchResult};
use crate::shared::{AppError, AppState};

/// HTTP handler for catalogue search
///
/// GET /anime/search?q=bebop&limit=5
#[instrument(name = "search_anime", skip(state, query))]
pub async fn search_anime(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let Query(query) = query.map_err(|e| {
        warn!(error = %e.body_text(), "Rejected search query");
        AppError::Validation("Invalid search parameters".to_string())
    })?;

    let term = query.q.unwrap_or_default();
    let results = state.search_service.search(&term, query.limit).await?;

    info!(term = %term, count = results.len(), "Search completed");
    Ok(Json(results))
}
