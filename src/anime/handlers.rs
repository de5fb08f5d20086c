use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{AnimeListItem, AnimeModel},
    service::AnimeService,
    types::{AddAnimeRequest, DataResponse, ListAnimeQuery, UpdateAnimeRequest, UpdateStatusRequest},
    validation,
};
use crate::auth::AuthClaims;
use crate::shared::{AppError, AppState, MessageResponse};

fn service(state: &AppState) -> AnimeService {
    AnimeService::new(Arc::clone(&state.anime_repository))
}

/// HTTP handler for adding an anime to the caller's list
///
/// POST /anime/add
#[instrument(name = "add_anime", skip(state, claims, payload), fields(user_id = %claims.user_id))]
pub async fn add_anime(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    payload: Result<Json<AddAnimeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<AnimeModel>>), AppError> {
    let Json(request) = payload?;

    let anime = service(&state).add_anime(&claims.user_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Anime added successfully", anime)),
    ))
}

/// HTTP handler for removing an anime from the caller's list
///
/// DELETE /anime/delete/:id
#[instrument(name = "delete_anime", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_anime(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(anime_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state)
        .delete_anime(&claims.user_id, &anime_id)
        .await?;

    Ok(Json(MessageResponse::new("Anime deleted successfully")))
}

/// HTTP handler for listing the caller's anime
///
/// GET /anime/list?status=watching
#[instrument(name = "list_anime", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn list_anime(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Query(query): Query<ListAnimeQuery>,
) -> Result<Json<Vec<AnimeListItem>>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "all")
        .map(validation::parse_status)
        .transpose()?;

    info!(user_id = %claims.user_id, "Fetching anime list");
    let items = service(&state).list_anime(&claims.user_id, status).await?;

    Ok(Json(items))
}

/// HTTP handler for a partial anime update
///
/// PATCH /anime/update/:id
#[instrument(name = "update_anime", skip(state, claims, payload), fields(user_id = %claims.user_id))]
pub async fn update_anime(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(anime_id): Path<String>,
    payload: Result<Json<UpdateAnimeRequest>, JsonRejection>,
) -> Result<Json<DataResponse<AnimeModel>>, AppError> {
    let Json(request) = payload?;

    let anime = service(&state)
        .update_anime(&claims.user_id, &anime_id, request)
        .await?;

    Ok(Json(DataResponse::new("Anime updated successfully", anime)))
}

/// HTTP handler for changing the caller's watch status
///
/// PATCH /anime/status/:id
#[instrument(name = "update_anime_status", skip(state, claims, payload), fields(user_id = %claims.user_id))]
pub async fn update_anime_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(anime_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;

    service(&state)
        .update_status(&claims.user_id, &anime_id, request)
        .await?;

    Ok(Json(MessageResponse::new("Anime status updated successfully")))
}
