use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// ============================================================================
// Fake Supabase (GoTrue + PostgREST subset) served on a local port
// ============================================================================

pub const GOOD_PASSWORD: &str = "hunter22";
pub const RATE_LIMITED_EMAIL: &str = "limited@example.com";

type Params = Query<HashMap<String, String>>;

#[derive(Default)]
pub struct FakeDb {
    pub auth_users: Vec<(String, String)>, // (id, email)
    pub users: Vec<Value>,
    pub anime: Vec<Value>,
    pub user_anime: Vec<Value>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct FakeSupabase {
    pub url: String,
    pub db: Arc<Mutex<FakeDb>>,
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value of an `eq.` filter in the query string
fn eq_filter(params: &HashMap<String, String>, column: &str) -> Option<String> {
    params
        .get(column)
        .and_then(|v| v.strip_prefix("eq."))
        .map(String::from)
}

fn matches(row: &Value, params: &HashMap<String, String>, columns: &[&str]) -> bool {
    columns.iter().all(|column| match eq_filter(params, column) {
        Some(expected) => text(&row[*column]) == expected,
        None => true,
    })
}

fn conflict() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })),
    )
        .into_response()
}

async fn require_apikey(req: Request, next: Next) -> Response {
    if req.headers().get("apikey").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "No API key found"})))
            .into_response();
    }
    next.run(req).await
}

async fn signup(State(fake): State<FakeSupabase>, Json(body): Json<Value>) -> Response {
    let email = text(&body["email"]);
    if email == RATE_LIMITED_EMAIL {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"code": 429, "msg": "email rate limit exceeded"})),
        )
            .into_response();
    }

    let mut db = fake.db.lock().unwrap();
    if db.auth_users.iter().any(|(_, e)| *e == email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": 422, "msg": "User already registered"})),
        )
            .into_response();
    }
    let id = format!("uuid-{}", db.auth_users.len() + 1);
    db.auth_users.push((id.clone(), email.clone()));

    // Email confirmation pending: bare user object
    Json(json!({ "id": id, "email": email, "confirmation_sent_at": Utc::now() })).into_response()
}

async fn token(
    State(fake): State<FakeSupabase>,
    Query(params): Params,
    Json(body): Json<Value>,
) -> Response {
    assert_eq!(params.get("grant_type").map(String::as_str), Some("password"));

    let email = text(&body["email"]);
    let db = fake.db.lock().unwrap();
    match db.auth_users.iter().find(|(_, e)| *e == email) {
        Some((id, email)) if body["password"] == GOOD_PASSWORD => Json(json!({
            "access_token": "supabase-session-jwt",
            "user": { "id": id, "email": email }
        }))
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response(),
    }
}

async fn users_insert(State(fake): State<FakeSupabase>, Json(rows): Json<Vec<Value>>) -> Response {
    let mut db = fake.db.lock().unwrap();
    for row in rows {
        // username is unique in the profiles table
        if db.users.iter().any(|u| u["username"] == row["username"]) {
            return conflict();
        }
        db.users.push(row);
    }
    StatusCode::CREATED.into_response()
}

async fn users_select(State(fake): State<FakeSupabase>, Query(params): Params) -> Json<Vec<Value>> {
    let db = fake.db.lock().unwrap();
    Json(
        db.users
            .iter()
            .filter(|row| matches(row, &params, &["id"]))
            .cloned()
            .collect(),
    )
}

async fn anime_select(State(fake): State<FakeSupabase>, Query(params): Params) -> Json<Vec<Value>> {
    let db = fake.db.lock().unwrap();

    if let Some(user_id) = eq_filter(&params, "user_anime.user_id") {
        assert_eq!(
            params.get("select").map(String::as_str),
            Some("*,user_anime!inner(status)")
        );
        let mut rows: Vec<Value> = db
            .anime
            .iter()
            .filter_map(|anime| {
                let relations: Vec<Value> = db
                    .user_anime
                    .iter()
                    .filter(|r| text(&r["anime_id"]) == text(&anime["id"]) && r["user_id"] == user_id)
                    .map(|r| json!({ "status": r["status"] }))
                    .collect();
                if relations.is_empty() {
                    return None;
                }
                let mut row = anime.clone();
                row["user_anime"] = Value::Array(relations);
                Some(row)
            })
            .collect();
        if params.get("order").map(String::as_str) == Some("created_at.desc") {
            rows.sort_by(|a, b| text(&b["created_at"]).cmp(&text(&a["created_at"])));
        }
        return Json(rows);
    }

    Json(
        db.anime
            .iter()
            .filter(|row| matches(row, &params, &["id", "name"]))
            .cloned()
            .collect(),
    )
}

async fn anime_insert(State(fake): State<FakeSupabase>, Json(rows): Json<Vec<Value>>) -> Response {
    let mut db = fake.db.lock().unwrap();
    let mut inserted = Vec::new();
    for mut row in rows {
        if db.anime.iter().any(|a| a["name"] == row["name"]) {
            return conflict();
        }
        db.next_id += 1;
        row["id"] = json!(db.next_id);
        // Strictly increasing timestamps keep ordering deterministic
        row["created_at"] = json!((Utc::now() + Duration::seconds(db.next_id)).to_rfc3339());
        db.anime.push(row.clone());
        inserted.push(row);
    }
    (StatusCode::CREATED, Json(inserted)).into_response()
}

async fn anime_patch(
    State(fake): State<FakeSupabase>,
    Query(params): Params,
    Json(changes): Json<Value>,
) -> Json<Vec<Value>> {
    let mut db = fake.db.lock().unwrap();
    let mut updated = Vec::new();
    for row in db
        .anime
        .iter_mut()
        .filter(|row| matches(row, &params, &["id", "user_id"]))
    {
        if let (Some(target), Some(changes)) = (row.as_object_mut(), changes.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        updated.push(row.clone());
    }
    Json(updated)
}

async fn user_anime_select(
    State(fake): State<FakeSupabase>,
    Query(params): Params,
) -> Json<Vec<Value>> {
    let db = fake.db.lock().unwrap();
    Json(
        db.user_anime
            .iter()
            .filter(|row| matches(row, &params, &["anime_id", "user_id"]))
            .cloned()
            .collect(),
    )
}

async fn user_anime_insert(
    State(fake): State<FakeSupabase>,
    Json(rows): Json<Vec<Value>>,
) -> Response {
    let mut db = fake.db.lock().unwrap();
    for row in rows {
        let duplicate = db.user_anime.iter().any(|r| {
            text(&r["anime_id"]) == text(&row["anime_id"]) && r["user_id"] == row["user_id"]
        });
        if duplicate {
            return conflict();
        }
        db.user_anime.push(row);
    }
    StatusCode::CREATED.into_response()
}

async fn user_anime_delete(
    State(fake): State<FakeSupabase>,
    Query(params): Params,
) -> Json<Vec<Value>> {
    let mut db = fake.db.lock().unwrap();
    let (removed, kept): (Vec<Value>, Vec<Value>) = db
        .user_anime
        .drain(..)
        .partition(|row| matches(row, &params, &["anime_id", "user_id"]));
    db.user_anime = kept;
    Json(removed)
}

async fn user_anime_patch(
    State(fake): State<FakeSupabase>,
    Query(params): Params,
    Json(changes): Json<Value>,
) -> Json<Vec<Value>> {
    let mut db = fake.db.lock().unwrap();
    let mut updated = Vec::new();
    for row in db
        .user_anime
        .iter_mut()
        .filter(|row| matches(row, &params, &["anime_id", "user_id"]))
    {
        row["status"] = changes["status"].clone();
        updated.push(row.clone());
    }
    Json(updated)
}

impl FakeSupabase {
    /// Starts the fake on an ephemeral port
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut fake = FakeSupabase::default();
        fake.url = format!("http://{}", listener.local_addr().unwrap());

        let router = Router::new()
            .route("/auth/v1/signup", post(signup))
            .route("/auth/v1/token", post(token))
            .route("/rest/v1/users", post(users_insert).get(users_select))
            .route(
                "/rest/v1/anime_list",
                post(anime_insert).get(anime_select).patch(anime_patch),
            )
            .route(
                "/rest/v1/user_anime",
                post(user_anime_insert)
                    .get(user_anime_select)
                    .delete(user_anime_delete)
                    .patch(user_anime_patch),
            )
            .layer(middleware::from_fn(require_apikey))
            .with_state(fake.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        fake
    }

    pub fn anime_rows(&self) -> usize {
        self.db.lock().unwrap().anime.len()
    }

    pub fn relation_rows(&self) -> usize {
        self.db.lock().unwrap().user_anime.len()
    }

    /// Overwrites the stored status of every relation for `anime_id`
    pub fn set_relation_status(&self, anime_id: &str, status: &str) {
        let mut db = self.db.lock().unwrap();
        for row in db
            .user_anime
            .iter_mut()
            .filter(|r| text(&r["anime_id"]) == anime_id)
        {
            row["status"] = json!(status);
        }
    }

    pub fn profile(&self, email: &str) -> Option<Value> {
        self.db
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u["email"] == email)
            .cloned()
    }
}
