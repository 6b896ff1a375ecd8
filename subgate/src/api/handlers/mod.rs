//! HTTP route handlers.

use axum::Json;
use serde_json::{Value, json};

pub mod subscriptions;
pub mod webhooks;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
