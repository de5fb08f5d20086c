use std::env;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
pub const DEFAULT_SUPABASE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 300;
const DEV_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_timeout_secs: u64,
    pub jikan_base_url: String,
    pub search_cache_ttl_secs: u64,
}

impl Config {
    /// Loads `.env` (if present) and reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            jwt_expiration_hours: parse_or(
                &get,
                "JWT_EXPIRATION_HOURS",
                DEFAULT_JWT_EXPIRATION_HOURS,
            )?,
            supabase_url: get("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            supabase_anon_key: get("SUPABASE_ANON_KEY"),
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_timeout_secs: parse_or(
                &get,
                "SUPABASE_TIMEOUT_SECS",
                DEFAULT_SUPABASE_TIMEOUT_SECS,
            )?,
            jikan_base_url: get("JIKAN_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_JIKAN_BASE_URL.to_string()),
            search_cache_ttl_secs: parse_or(
                &get,
                "SEARCH_CACHE_TTL_SECS",
                DEFAULT_SEARCH_CACHE_TTL_SECS,
            )?,
        })
    }

    pub fn uses_supabase(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
