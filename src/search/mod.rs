// Public API - what other modules can use
pub use handlers::search_anime;
pub use provider::{AnimeSearchProvider, JikanSearchProvider};
pub use service::SearchService;
pub use types::SearchResult;

// Internal modules
mod handlers;
mod provider;
mod service;
mod types;
