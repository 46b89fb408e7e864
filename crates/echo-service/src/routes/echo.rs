//! `POST /api/echo`: echo a JSON `message` back with its length.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::error::{json_type_name, EchoError};

pub const ECHO_PATH: &str = "/api/echo";

/// The part of an echo request body the service reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub message: String,
}

impl EchoRequest {
    /// Extract `message` from a JSON object body.
    ///
    /// Parsing and validation fail separately so the caller learns which
    /// one it got wrong. Fields other than `message` are ignored, and a
    /// non-string `message` is rejected rather than coerced.
    pub fn from_slice(body: &[u8]) -> Result<Self, EchoError> {
        let mut fields = match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => fields,
            other => {
                return Err(EchoError::NotAnObject {
                    found: json_type_name(&other),
                })
            }
        };

        match fields.remove("message") {
            Some(Value::String(message)) => Ok(Self { message }),
            Some(other) => Err(EchoError::MessageNotString {
                found: json_type_name(&other),
            }),
            None => Err(EchoError::MissingMessage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoResponse {
    pub echo: String,
    /// Unicode scalar values in `echo`, not bytes.
    pub length: usize,
}

impl From<EchoRequest> for EchoResponse {
    fn from(req: EchoRequest) -> Self {
        let length = req.message.chars().count();
        Self {
            echo: req.message,
            length,
        }
    }
}

/// Returns a router with `POST /api/echo`.
///
/// Bodies larger than `body_limit` bytes get 413. `None` accepts any size.
pub fn echo_routes(body_limit: Option<usize>) -> Router {
    let limit = match body_limit {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };
    Router::new()
        .route(ECHO_PATH, post(echo_handler))
        .layer(limit)
}

// Takes raw bytes rather than `Json<_>` so that the content type is not
// checked and every rejection uses the echo error body.
async fn echo_handler(body: Bytes) -> Result<Json<EchoResponse>, EchoError> {
    let request = EchoRequest::from_slice(&body)?;
    Ok(Json(request.into()))
}
