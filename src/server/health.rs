//! Health check endpoint.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Body of the health response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `OK`.
    pub status: &'static str,
}

/// Returns 200 with a static body while the server is running.
pub async fn health_handler() -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(HealthStatus { status: "OK" }))
}
