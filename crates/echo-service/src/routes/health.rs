//! `GET /health`: liveness check.
//!
//! Must not touch anything but the clock, so health checks keep answering while
//! the rest of the service is degraded.

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Unix seconds when the request was handled.
    pub timestamp: i64,
}

impl HealthResponse {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Returns a router with `GET /health`.
pub fn health_routes() -> Router {
    Router::new().route(HEALTH_PATH, get(health_handler))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::now())
}
