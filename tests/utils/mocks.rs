use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use anitrack::{AnimeSearchProvider, AppError, SearchResult};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Search provider returning a fixed catalogue filtered by title
pub struct StaticSearchProvider {
    catalogue: Vec<SearchResult>,
    calls: AtomicUsize,
}

impl StaticSearchProvider {
    pub fn new(titles: &[&str]) -> Self {
        Self {
            catalogue: titles
                .iter()
                .enumerate()
                .map(|(i, title)| SearchResult {
                    mal_id: i as u64 + 1,
                    title: title.to_string(),
                    image_url: Some(format!("https://cdn.example/{}.jpg", i + 1)),
                    score: Some(8.0),
                    genres: vec!["Action".to_string()],
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnimeSearchProvider for StaticSearchProvider {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let needle = query.to_lowercase();
        Ok(self
            .catalogue
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
