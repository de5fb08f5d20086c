use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use anitrack::{
    anime::repository::InMemoryAnimeRepository,
    auth::repository::InMemoryAuthRepository,
    create_app, AnimeRepository, AnimeSearchProvider, AppState, AuthRepository, SearchService,
    TokenConfig,
};

use super::mocks::StaticSearchProvider;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
}

pub struct TestAppBuilder {
    auth_repository: Arc<dyn AuthRepository + Send + Sync>,
    anime_repository: Arc<dyn AnimeRepository + Send + Sync>,
    search_provider: Arc<dyn AnimeSearchProvider + Send + Sync>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            auth_repository: Arc::new(InMemoryAuthRepository::new()),
            anime_repository: Arc::new(InMemoryAnimeRepository::new()),
            search_provider: Arc::new(StaticSearchProvider::new(&[])),
        }
    }

    pub fn with_auth_repository(mut self, repo: Arc<dyn AuthRepository + Send + Sync>) -> Self {
        self.auth_repository = repo;
        self
    }

    pub fn with_anime_repository(mut self, repo: Arc<dyn AnimeRepository + Send + Sync>) -> Self {
        self.anime_repository = repo;
        self
    }

    pub fn with_search_provider(
        mut self,
        provider: Arc<dyn AnimeSearchProvider + Send + Sync>,
    ) -> Self {
        self.search_provider = provider;
        self
    }

    pub fn build(self) -> TestApp {
        let state = AppState::new(
            self.auth_repository,
            self.anime_repository,
            SearchService::new(self.search_provider, Duration::from_secs(300)),
            TokenConfig::default(),
        );

        TestApp {
            router: create_app(state),
        }
    }
}

impl TestApp {
    /// Sends a request through the router and returns status plus parsed JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str, username: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": email, "password": password, "username": username })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers a fresh user and returns their bearer token
    pub async fn signed_in_user(&self, username: &str) -> String {
        let email = format!("{}@example.com", username);
        let (status, _) = self.register(&email, "hunter22", username).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.login(&email, "hunter22").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Adds an anime and returns its id
    pub async fn add_anime(&self, token: &str, name: &str, rating: f64) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/anime/add",
                Some(token),
                Some(json!({
                    "name": name,
                    "image_url": format!("https://cdn.example/{}.jpg", name),
                    "vote_average": rating
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn list_names(&self, token: &str) -> Vec<String> {
        let (status, body) = self.request("GET", "/anime/list", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap().to_string())
            .collect()
    }
}
