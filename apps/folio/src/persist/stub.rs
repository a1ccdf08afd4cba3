//! In-memory stand-in for the remote file store, used by persistence tests.
//! Mirrors the real surface: list-all, upsert-one keyed by sanitized title
//! (mandatory), delete-by-key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::Value;

use crate::persist::remote::sanitize_title;

pub type SharedFiles = Arc<Mutex<HashMap<String, Value>>>;

/// Binds the stub on an ephemeral port and returns its base URL plus a handle
/// on the stored files.
pub async fn start() -> (String, SharedFiles) {
    let files: SharedFiles = Arc::new(Mutex::new(HashMap::new()));
    let app = Router::new()
        .route("/collection-items", get(list).post(upsert))
        .route("/collection-items/:key", delete(remove))
        .with_state(files.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), files)
}

async fn list(State(files): State<SharedFiles>) -> Json<Vec<Value>> {
    Json(files.lock().unwrap().values().cloned().collect())
}

async fn upsert(State(files): State<SharedFiles>, Json(body): Json<Value>) -> StatusCode {
    let title = body
        .get("displayTitle")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if title.is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }
    files
        .lock()
        .unwrap()
        .insert(sanitize_title(title), body);
    StatusCode::OK
}

async fn remove(State(files): State<SharedFiles>, Path(key): Path<String>) -> StatusCode {
    match files.lock().unwrap().remove(&key) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}
