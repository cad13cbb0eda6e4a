// ABOUTME: Health check endpoint
// ABOUTME: Reports service liveness without touching backing stores

use axum::Json;
use serde_json::{json, Value};

use todo_core::{now_millis, SERVICE_NAME};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_millis() / 1000,
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE_NAME
    }))
}
