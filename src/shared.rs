use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::anime::repository::{AnimeRepository, InMemoryAnimeRepository};
use crate::auth::repository::{AuthRepository, InMemoryAuthRepository};
use crate::auth::TokenConfig;
use crate::config::Config;
use crate::search::{JikanSearchProvider, SearchService};
use crate::supabase::{
    SupabaseAnimeRepository, SupabaseAuthRepository, SupabaseClient, SupabaseConfig,
};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub auth_repository: Arc<dyn AuthRepository + Send + Sync>,
    pub anime_repository: Arc<dyn AnimeRepository + Send + Sync>,
    pub search_service: SearchService,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        auth_repository: Arc<dyn AuthRepository + Send + Sync>,
        anime_repository: Arc<dyn AnimeRepository + Send + Sync>,
        search_service: SearchService,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            auth_repository,
            anime_repository,
            search_service,
            token_config,
        }
    }

    /// Wires repositories from configuration.
    /// Falls back to in-memory storage when Supabase credentials are absent.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let token_config = TokenConfig::new(config.jwt_secret.clone(), config.jwt_expiration_hours);

        let search_provider = Arc::new(JikanSearchProvider::new(
            config.jikan_base_url.clone(),
            Duration::from_secs(config.supabase_timeout_secs),
        )?);
        let search_service = SearchService::new(
            search_provider,
            Duration::from_secs(config.search_cache_ttl_secs),
        );

        let state = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(anon_key)) => {
                info!(supabase_url = %url, "Using Supabase backend");
                let client = SupabaseClient::new(SupabaseConfig {
                    url: url.clone(),
                    anon_key: anon_key.clone(),
                    service_role_key: config.supabase_service_role_key.clone(),
                    timeout: Duration::from_secs(config.supabase_timeout_secs),
                })?;

                Self::new(
                    Arc::new(SupabaseAuthRepository::new(client.clone())),
                    Arc::new(SupabaseAnimeRepository::new(client)),
                    search_service,
                    token_config,
                )
            }
            _ => {
                warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set, using in-memory storage");
                Self::new(
                    Arc::new(InMemoryAuthRepository::new()),
                    Arc::new(InMemoryAnimeRepository::new()),
                    search_service,
                    token_config,
                )
            }
        };

        Ok(state)
    }
}

/// Plain `{"message": ...}` response body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: {message}")]
    RateLimited { message: String, retry_after: u64 },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Replaces storage and upstream failures with a caller-facing message.
    /// Client errors pass through unchanged.
    pub fn mask_upstream(self, message: &str) -> AppError {
        match self {
            AppError::Upstream(cause) | AppError::DatabaseError(cause) => {
                error!(cause = %cause, "{}", message);
                AppError::Upstream(message.to_string())
            }
            AppError::Internal => {
                error!("{}", message);
                AppError::Upstream(message.to_string())
            }
            other => other,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected request body");
        AppError::Validation("Invalid request format".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::RateLimited {
            message,
            retry_after,
        } = self
        {
            let body = Json(json!({
                "error": message,
                "retryAfter": retry_after
            }));
            return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        }

        let (status, error_message) = match self {
            AppError::JwtError(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Unmasked database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal | AppError::RateLimited { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
