//! HTTP API server.
//!
//! Exposes the memory bank and session lifecycle of a single in-process
//! concierge. The concierge has no internal locking, so every request goes
//! through one async mutex.

use crate::cli::Output;
use crate::concierge::StudyConcierge;
use crate::config::Settings;
use crate::memory_bank::{SearchHit, StoreEntry};
use crate::session::{Session, UserHistory};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
type AppState = Arc<Mutex<StudyConcierge>>;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state: AppState = Arc::new(Mutex::new(StudyConcierge::new(settings)?));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("StudyConcierge API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("List keys", "GET    /memory");
    Output::kv("Clear memory", "DELETE /memory");
    Output::kv("Save", "POST   /memory/:key");
    Output::kv("Retrieve", "GET    /memory/:key?limit=N");
    Output::kv("Delete key", "DELETE /memory/:key");
    Output::kv("Search", "POST   /search");
    Output::kv("Start session", "POST   /sessions");
    Output::kv("Current session", "GET    /sessions/current");
    Output::kv("Record progress", "POST   /sessions/current/progress");
    Output::kv("End session", "DELETE /sessions/current");
    Output::kv("User history", "GET    /users/:user_id/history");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/memory", get(list_keys).delete(clear_memory))
        .route(
            "/memory/{key}",
            post(save_memory).get(get_memory).delete(delete_memory),
        )
        .route("/search", post(search))
        .route("/sessions", post(start_session))
        .route(
            "/sessions/current",
            get(current_session).delete(end_session),
        )
        .route("/sessions/current/progress", post(update_progress))
        .route("/users/{user_id}/history", get(user_history))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct KeysResponse {
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct RecallResponse {
    key: String,
    values: Vec<Value>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct StartSessionRequest {
    user_id: String,
}

#[derive(Serialize)]
struct StartSessionResponse {
    session_id: String,
}

// === Handlers ===

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_keys(State(state): State<AppState>) -> Json<KeysResponse> {
    let concierge = state.lock().await;
    Json(KeysResponse {
        keys: concierge.keys(),
    })
}

async fn clear_memory(State(state): State<AppState>) -> StatusCode {
    state.lock().await.clear_memory();
    StatusCode::NO_CONTENT
}

async fn save_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(data): Json<Value>,
) -> (StatusCode, Json<StoreEntry>) {
    let entry = state.lock().await.remember(&key, data);
    (StatusCode::CREATED, Json(entry))
}

async fn get_memory(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<RecallResponse> {
    let values = state.lock().await.recall(&key, query.limit);
    Json(RecallResponse { key, values })
}

async fn delete_memory(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    if state.lock().await.forget(&key) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let results = state.lock().await.search(&request.query, request.top_k);
    Json(SearchResponse { results })
}

async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> (StatusCode, Json<StartSessionResponse>) {
    let session_id = state.lock().await.start_session(&request.user_id);
    (StatusCode::CREATED, Json(StartSessionResponse { session_id }))
}

async fn current_session(
    State(state): State<AppState>,
) -> Result<Json<Session>, StatusCode> {
    state
        .lock()
        .await
        .current_session()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_progress(
    State(state): State<AppState>,
    Json(progress): Json<Value>,
) -> StatusCode {
    if state.lock().await.update_progress(progress) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

async fn end_session(State(state): State<AppState>) -> StatusCode {
    if state.lock().await.end_session().await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn user_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<UserHistory> {
    Json(state.lock().await.user_history(&user_id))
}
