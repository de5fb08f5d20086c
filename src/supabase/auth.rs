use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::client::{KeyRole, SupabaseClient};
use crate::auth::models::{AuthIdentity, UserModel};
use crate::auth::repository::AuthRepository;
use crate::shared::AppError;

const USERS_TABLE: &str = "users";

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
}

/// GoTrue returns either a session wrapping the user or the bare user
/// (when email confirmation is pending)
fn identity_from(body: Value, fallback_email: &str) -> Result<AuthIdentity, AppError> {
    let user = match body.get("user") {
        Some(user) if !user.is_null() => user.clone(),
        _ => body,
    };
    let user: GoTrueUser = serde_json::from_value(user)
        .map_err(|_| AppError::Upstream("No user data returned".to_string()))?;

    Ok(AuthIdentity {
        id: user.id,
        email: user.email.unwrap_or_else(|| fallback_email.to_string()),
    })
}

/// AuthRepository backed by Supabase auth and the `users` table
pub struct SupabaseAuthRepository {
    client: SupabaseClient,
}

impl SupabaseAuthRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthRepository for SupabaseAuthRepository {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        debug!(email = %email, "Creating Supabase auth user");

        let request = self
            .client
            .auth(Method::POST, "/signup")
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self.client.send_json(request).await?;

        identity_from(body, email)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        debug!(email = %email, "Signing in with Supabase password grant");

        let request = self
            .client
            .auth(Method::POST, "/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self.client.send_json(request).await?;

        identity_from(body, email)
    }

    #[instrument(skip(self, profile))]
    async fn create_profile(&self, profile: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %profile.id, "Inserting user profile");

        let request = self
            .client
            .table(Method::POST, USERS_TABLE, KeyRole::Service)
            .header("Prefer", "return=minimal")
            .json(&[profile]);

        self.client.send_empty(request).await
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let request = self
            .client
            .table(Method::GET, USERS_TABLE, KeyRole::Service)
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", user_id)),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<UserModel> = self.client.send_json(request).await?;

        debug!(found = !rows.is_empty(), "Fetched user profile");
        Ok(rows.into_iter().next())
    }
}
