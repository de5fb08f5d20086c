use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{LoginRequest, LoginResponse, RegisterRequest},
};
use crate::shared::{AppError, AppState, MessageResponse};

/// HTTP handler for registering a new user
///
/// POST /auth/register
#[instrument(name = "register", skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload?;

    let service = AuthService::new(
        Arc::clone(&state.auth_repository),
        state.token_config.clone(),
    );
    let profile = service.register(request).await?;

    info!(user_id = %profile.id, "Registration request completed");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// HTTP handler for password login
///
/// POST /auth/login
/// Returns a JWT and the public user record
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;

    let service = AuthService::new(
        Arc::clone(&state.auth_repository),
        state.token_config.clone(),
    );
    let response = service.login(request).await?;

    Ok(Json(response))
}
