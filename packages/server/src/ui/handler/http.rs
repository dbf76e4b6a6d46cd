//! HTTP API endpoint handlers.
//!
//! Only a health check is exposed. Room ids are the sole barrier to joining,
//! so nothing here enumerates rooms or their members.

use axum::Json;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
