//! Health check endpoints

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Root status response
#[derive(Serialize)]
pub struct RootResponse {
    pub status: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Fixed status payload at `/`
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "Backend is running",
    })
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build health router (no state needed)
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
