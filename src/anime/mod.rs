// Public API - what other modules can use
pub use handlers::{add_anime, delete_anime, list_anime, update_anime, update_anime_status};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
pub mod validation;
