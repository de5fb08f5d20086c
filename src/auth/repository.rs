use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use super::models::{AuthIdentity, UserModel};
use crate::shared::AppError;

/// Trait for the auth provider and the user profile table
#[async_trait]
pub trait AuthRepository {
    /// Creates a new auth identity for the email/password pair
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError>;
    /// Verifies credentials, returning `AppError::InvalidCredentials` on mismatch
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError>;
    async fn create_profile(&self, profile: &UserModel) -> Result<(), AppError>;
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
}

struct Credential {
    user_id: String,
    password_hash: String,
}

/// In-memory implementation of AuthRepository for development and testing
///
/// Passwords are stored as bcrypt hashes. Data is lost when the
/// application restarts.
pub struct InMemoryAuthRepository {
    credentials: Mutex<HashMap<String, Credential>>, // email -> credential
    profiles: Mutex<HashMap<String, UserModel>>,     // user_id -> profile
}

impl Default for InMemoryAuthRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            credentials: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of stored profiles
    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    /// Checks if a profile exists by user id
    pub fn has_profile(&self, user_id: &str) -> bool {
        self.profiles.lock().unwrap().contains_key(user_id)
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal
    })
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash).map_err(|e| {
        error!(error = %e, "Failed to verify password hash");
        AppError::Internal
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthRepository for InMemoryAuthRepository {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        let email = normalize_email(email);
        debug!(email = %email, "Creating auth identity in memory");

        if self.credentials.lock().unwrap().contains_key(&email) {
            warn!(email = %email, "Identity already exists in memory");
            return Err(AppError::Upstream("User already registered".to_string()));
        }

        // Hash outside the lock
        let password_hash = hash_password(password)?;
        let user_id = Uuid::new_v4().to_string();

        let mut credentials = self.credentials.lock().unwrap();
        if credentials.contains_key(&email) {
            warn!(email = %email, "Identity registered concurrently");
            return Err(AppError::Upstream("User already registered".to_string()));
        }
        credentials.insert(
            email.clone(),
            Credential {
                user_id: user_id.clone(),
                password_hash,
            },
        );
        drop(credentials);

        debug!(user_id = %user_id, "Auth identity created in memory");
        Ok(AuthIdentity { id: user_id, email })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        let email = normalize_email(email);
        debug!(email = %email, "Verifying credentials in memory");

        let stored = self
            .credentials
            .lock()
            .unwrap()
            .get(&email)
            .map(|c| (c.user_id.clone(), c.password_hash.clone()));

        let verified = match &stored {
            Some((_, password_hash)) => verify_password(password, password_hash)?,
            None => false,
        };

        match stored {
            Some((user_id, _)) if verified => Ok(AuthIdentity { id: user_id, email }),
            _ => {
                debug!(email = %email, "Credentials rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    #[instrument(skip(self, profile))]
    async fn create_profile(&self, profile: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %profile.id, username = %profile.username, "Creating profile in memory");

        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&profile.id) {
            warn!(user_id = %profile.id, "Profile already exists in memory");
            return Err(AppError::DatabaseError("Profile already exists".to_string()));
        }
        profiles.insert(profile.id.clone(), profile.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let profiles = self.profiles.lock().unwrap();
        let profile = profiles.get(user_id).cloned();

        match &profile {
            Some(p) => debug!(user_id = %user_id, username = %p.username, "Profile found in memory"),
            None => debug!(user_id = %user_id, "Profile not found in memory"),
        }

        Ok(profile)
    }
}
