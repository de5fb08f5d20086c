// Public API - what other modules can use
pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::AuthClaims;

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
mod token;
pub mod types;
