//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub version: &'static str,
}

/// `GET /` — reports that the server is up.
pub async fn root_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is running",
        version: bookapp_core::version(),
    })
}
