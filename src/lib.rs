// Library crate for the anime tracker API
// This file exposes the public API for integration tests

pub mod anime;
pub mod app;
pub mod auth;
pub mod config;
pub mod search;
pub mod shared;
pub mod supabase;

// Re-export commonly used types for easier access in tests
pub use anime::{models::WatchStatus, repository::AnimeRepository};
pub use app::create_app;
pub use auth::{repository::AuthRepository, AuthClaims, TokenConfig};
pub use config::Config;
pub use search::{AnimeSearchProvider, SearchResult, SearchService};
pub use shared::{AppError, AppState};
