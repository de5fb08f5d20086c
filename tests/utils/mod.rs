#![allow(dead_code)]

pub mod fake_supabase;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use fake_supabase::FakeSupabase;
#[allow(unused_imports)]
pub use mocks::StaticSearchProvider;
#[allow(unused_imports)]
pub use setup::{TestApp, TestAppBuilder};
