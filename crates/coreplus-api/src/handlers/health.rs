//! Health check handler.

use axum::Json;
use chrono::{DateTime, Utc};

use crate::dto::response::{ApiResponse, HealthResponse};

/// GET /health
pub async fn health(started_at: DateTime<Utc>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - started_at).num_seconds(),
    }))
}
