//! JSON error model.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Errors that render as an [`ErrorResponse`].
///
/// ```ignore
/// impl HttpError for LookupError {
///     fn status_code(&self) -> StatusCode {
///         StatusCode::NOT_FOUND
///     }
///
///     fn message(&self) -> String {
///         format!("no entry named {}", self.name)
///     }
/// }
/// ```
pub trait HttpError: fmt::Debug {
    fn status_code(&self) -> StatusCode;

    /// Human-readable diagnostic for the caller.
    fn message(&self) -> String;

    /// Short, stable label. Defaults to the reason phrase of the status.
    fn error(&self) -> String {
        reason_phrase(self.status_code()).to_string()
    }

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let body = ErrorResponse::new(self.error(), self.message());
        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// The one error body this service emits: `{"error": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Label the error with the reason phrase of `status`.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(reason_phrase(status), message)
    }
}

pub(crate) fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}

/// Why an echo request body was rejected.
#[derive(Debug)]
pub enum EchoError {
    /// The body is not JSON at all (an empty body included).
    Parse(serde_json::Error),
    /// Valid JSON, but not an object.
    NotAnObject { found: &'static str },
    /// An object without a `message` key.
    MissingMessage,
    /// `message` is present but is not a string.
    MessageNotString { found: &'static str },
}

impl EchoError {
    /// Label every echo rejection carries in its `error` field.
    pub const LABEL: &'static str = "Invalid JSON";
}

/// Name of a JSON value's type, for diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for EchoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "request body is not valid JSON: {}", err),
            Self::NotAnObject { found } => {
                write!(f, "expected a JSON object with a \"message\" field, got {}", found)
            }
            Self::MissingMessage => f.write_str("missing required field \"message\""),
            Self::MessageNotString { found } => {
                write!(f, "field \"message\" must be a string, got {}", found)
            }
        }
    }
}

impl std::error::Error for EchoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EchoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl HttpError for EchoError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn error(&self) -> String {
        Self::LABEL.to_string()
    }
}

impl IntoResponse for EchoError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejecting echo request");
        self.into_http_response()
    }
}
