use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{
    models::UserModel,
    repository::AuthRepository,
    token::TokenConfig,
    types::{LoginRequest, LoginResponse, LoginUser, RegisterRequest},
};
use crate::shared::AppError;

pub const REGISTER_RETRY_AFTER_SECS: u64 = 60;

/// Service for handling registration and login
pub struct AuthService {
    repository: Arc<dyn AuthRepository + Send + Sync>,
    token_config: TokenConfig,
}

/// Returns the trimmed value when it is present and non-blank
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn AuthRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Creates an auth identity and its profile row
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserModel, AppError> {
        let (email, password, username) = match (
            required(&request.email),
            request.password.as_deref().filter(|p| !p.is_empty()),
            required(&request.username),
        ) {
            (Some(email), Some(password), Some(username)) => (email, password, username),
            _ => {
                return Err(AppError::Validation(
                    "Email, password and username are required".to_string(),
                ))
            }
        };

        debug!(email = %email, username = %username, "Registering user");

        let identity = self
            .repository
            .sign_up(email, password)
            .await
            .map_err(registration_error)?;

        let profile = UserModel::new(&identity, username.to_string());
        self.repository
            .create_profile(&profile)
            .await
            .map_err(registration_error)?;

        info!(user_id = %profile.id, username = %profile.username, "User registered");
        Ok(profile)
    }

    /// Verifies credentials and issues a session token
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (email, password) = match (
            required(&request.email),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(email), Some(password)) => (email, password),
            _ => {
                return Err(AppError::Validation(
                    "Email and password are required".to_string(),
                ))
            }
        };

        debug!(email = %email, "Attempting login");

        let identity = self
            .repository
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                AppError::Upstream(msg) => {
                    warn!(error = %msg, "Auth provider rejected login");
                    AppError::Unauthorized(msg)
                }
                other => other,
            })?;

        let profile = self
            .repository
            .get_profile(&identity.id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %identity.id, "Profile fetch failed");
                AppError::Unauthorized("Failed to fetch user profile".to_string())
            })?
            .ok_or_else(|| {
                warn!(user_id = %identity.id, "No profile found for user");
                AppError::Unauthorized("User profile not found".to_string())
            })?;

        let token = self
            .token_config
            .create_token(&identity.id, &identity.email, profile.role)
            .map_err(|e| {
                error!(error = %e, "Failed to sign token");
                AppError::Internal
            })?;

        info!(user_id = %identity.id, "Login successful");

        Ok(LoginResponse {
            token,
            user: LoginUser {
                id: identity.id,
                email: identity.email,
                role: profile.role,
            },
        })
    }
}

fn registration_error(e: AppError) -> AppError {
    match e {
        AppError::RateLimited { .. } => AppError::RateLimited {
            message: "Please wait 1 minute before trying to register again".to_string(),
            retry_after: REGISTER_RETRY_AFTER_SECS,
        },
        AppError::Upstream(msg) | AppError::Conflict(msg) if !msg.trim().is_empty() => {
            AppError::Upstream(msg)
        }
        err @ (AppError::Upstream(_)
        | AppError::Conflict(_)
        | AppError::DatabaseError(_)
        | AppError::Internal) => {
            error!(error = %err, "Registration failed");
            AppError::Upstream("Registration failed".to_string())
        }
        other => other,
    }
}
