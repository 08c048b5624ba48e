use axum::{http::StatusCode, response::IntoResponse, Json};
use log::debug;
use serde_json::json;

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    debug!("GET /api/health");
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
