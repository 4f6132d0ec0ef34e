//! API handlers for the sample service.

use axum::Json;
use serde_json::{Value, json};

/// GET /
/// Greeting endpoint
pub async fn root() -> Json<Value> {
    Json(json!({ "Hello": "DevOps Learner" }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
