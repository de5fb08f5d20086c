use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{anime, auth, search, shared::AppState};

/// Health check
///
/// GET /
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Anime Tracker API is running"
    }))
}

/// Builds the full application router
pub fn create_app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything under /anime requires a bearer token
    let anime_routes = Router::new()
        .route("/add", post(anime::add_anime))
        .route("/delete/:id", delete(anime::delete_anime))
        .route("/list", get(anime::list_anime))
        .route("/update/:id", patch(anime::update_anime))
        .route("/status/:id", patch(anime::update_anime_status))
        .route("/search", get(search::search_anime))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/", get(health))
        .nest("/auth", auth_routes)
        .nest("/anime", anime_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
