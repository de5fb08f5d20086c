use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub timeout: Duration,
}

/// Which key a request is made with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRole {
    Anon,
    /// Falls back to the anon key when no service role key is configured
    Service,
}

/// HTTP client for the Supabase auth (GoTrue) and data (PostgREST) APIs
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
}

/// Error body shapes returned by GoTrue and PostgREST
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(concat!("anitrack/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn key(&self, role: KeyRole) -> &str {
        match role {
            KeyRole::Anon => &self.config.anon_key,
            KeyRole::Service => self
                .config
                .service_role_key
                .as_deref()
                .unwrap_or(&self.config.anon_key),
        }
    }

    fn request(&self, method: Method, path: &str, role: KeyRole) -> RequestBuilder {
        let key = self.key(role);
        self.http
            .request(method, format!("{}{}", self.config.url, path))
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Request against the GoTrue auth API, e.g. `auth("/signup")`
    pub fn auth(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, &format!("/auth/v1{}", path), KeyRole::Anon)
    }

    /// Request against a PostgREST table
    pub fn table(&self, method: Method, table: &str, role: KeyRole) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{}", table), role)
    }

    /// Sends the request and decodes a JSON body, mapping service errors
    #[instrument(skip(self, request))]
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AppError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to decode Supabase response");
            AppError::Upstream(format!("Invalid response from Supabase: {e}"))
        })
    }

    /// Sends the request, discarding any body on success
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), AppError> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(timeout_secs = self.config.timeout.as_secs(), "Supabase request timed out");
                AppError::Upstream("Supabase request timed out".to_string())
            } else if e.is_connect() {
                warn!(error = %e, "Supabase connection failed");
                AppError::Upstream(format!("Connection failed: {e}"))
            } else {
                AppError::Upstream(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Supabase request succeeded");
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(map_error(status, &body))
    }
}

fn map_error(status: StatusCode, body: &ErrorBody) -> AppError {
    let message = body
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Supabase returned HTTP {}", status.as_u16()));

    warn!(status = status.as_u16(), code = ?body.code, error = %message, "Supabase request failed");

    if status == StatusCode::TOO_MANY_REQUESTS {
        return AppError::RateLimited {
            message,
            retry_after: 60,
        };
    }
    if status == StatusCode::CONFLICT {
        return AppError::Conflict(message);
    }
    if message.contains("Invalid login credentials") {
        return AppError::InvalidCredentials;
    }
    AppError::Upstream(message)
}
