use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Account role stored on the user profile
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Identity returned by the auth provider after sign-up or sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct AuthIdentity {
    pub id: String,
    pub email: String,
}

/// Profile row for the users table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a profile for a freshly registered identity with the default role
    pub fn new(identity: &AuthIdentity, username: String) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            username,
            role: Role::User,
            created_at: Utc::now(),
        }
    }
}
