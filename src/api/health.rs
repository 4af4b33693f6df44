use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::AppState;

/// Service availability probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "message": state.app_name.as_ref() }))
}
