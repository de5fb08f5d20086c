use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::provider::AnimeSearchProvider;
use super::types::SearchResult;
use crate::shared::AppError;

pub const MIN_QUERY_CHARS: usize = 3;
pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 25;
const MAX_CACHED_QUERIES: u64 = 1_000;

/// Catalogue search with a short-lived result cache
#[derive(Clone)]
pub struct SearchService {
    provider: Arc<dyn AnimeSearchProvider + Send + Sync>,
    cache: Cache<(String, u32), Arc<Vec<SearchResult>>>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn AnimeSearchProvider + Send + Sync>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_QUERIES)
            .time_to_live(ttl)
            .build();

        Self { provider, cache }
    }

    /// Short queries return nothing without touching the provider
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SearchResult>, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let key = (query.to_lowercase(), limit);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(query = %query, "Search cache hit");
            return Ok(cached.as_ref().clone());
        }

        let results = self
            .provider
            .search(query, limit)
            .await
            .map_err(|e| match e {
                AppError::RateLimited { .. } => e,
                other => other.mask_upstream("Failed to search anime"),
            })?;

        self.cache.insert(key, Arc::new(results.clone())).await;
        Ok(results)
    }
}
