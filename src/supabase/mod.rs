//! Supabase-backed repositories.
//!
//! Auth goes through GoTrue (`/auth/v1`), tables through PostgREST (`/rest/v1`).

pub use anime::SupabaseAnimeRepository;
pub use auth::SupabaseAuthRepository;
pub use client::{KeyRole, SupabaseClient, SupabaseConfig};

mod anime;
mod auth;
mod client;
