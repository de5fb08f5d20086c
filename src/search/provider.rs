use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::types::{JikanSearchResponse, SearchResult};
use crate::shared::AppError;

pub const SEARCH_RETRY_AFTER_SECS: u64 = 1;

/// Source of anime catalogue search results
#[async_trait]
pub trait AnimeSearchProvider {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>, AppError>;
}

/// Search provider backed by the public Jikan (MyAnimeList) API
pub struct JikanSearchProvider {
    http: Client,
    base_url: String,
}

impl JikanSearchProvider {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(concat!("anitrack/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl AnimeSearchProvider for JikanSearchProvider {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>, AppError> {
        let response = self
            .http
            .get(format!("{}/anime", self.base_url))
            .query(&[("q", query.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Jikan request failed");
                AppError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Jikan rate limit hit");
            return Err(AppError::RateLimited {
                message: "Rate limited. Please wait a moment...".to_string(),
                retry_after: SEARCH_RETRY_AFTER_SECS,
            });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Jikan returned an error status");
            return Err(AppError::Upstream(format!(
                "Jikan returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: JikanSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid response from Jikan: {e}")))?;

        debug!(count = body.data.len(), "Jikan search returned results");
        Ok(body.data.into_iter().map(SearchResult::from).collect())
    }
}
