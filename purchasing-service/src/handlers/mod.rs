//! HTTP handlers for purchasing-service.

pub mod documents;
pub mod payments;
pub mod reference;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "purchasing-service" })),
    )
}

pub async fn metrics() -> impl IntoResponse {
    (StatusCode::OK, get_metrics())
}
