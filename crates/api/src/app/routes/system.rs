use axum::{http::StatusCode, Json};
use serde_json::json;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Browsable root: where each collection lives.
pub async fn api_root() -> Json<serde_json::Value> {
    Json(json!({
        "users": "/api/users/",
        "zones": "/api/zones/",
        "tours": "/api/tours/",
    }))
}
