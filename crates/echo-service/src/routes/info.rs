//! `GET /`: static service description.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use super::{ECHO_PATH, HEALTH_PATH};

pub const API_VERSION: &str = "1.0.0";

/// Advertised endpoints, in the order clients see them.
pub const ENDPOINTS: [&str; 2] = [HEALTH_PATH, ECHO_PATH];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoResponse {
    pub message: String,
    pub version: &'static str,
    pub endpoints: [&'static str; 2],
}

impl InfoResponse {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            message: service_name.into(),
            version: API_VERSION,
            endpoints: ENDPOINTS,
        }
    }
}

/// Returns a router with `GET /`.
///
/// The body is built once here; the handler only serializes it.
pub fn info_routes(service_name: &str) -> Router {
    let info = Arc::new(InfoResponse::new(service_name));
    Router::new().route("/", get(info_handler)).with_state(info)
}

async fn info_handler(State(info): State<Arc<InfoResponse>>) -> Json<InfoResponse> {
    Json(InfoResponse::clone(&info))
}
