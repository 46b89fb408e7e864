use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ErrorResponse;

/// JSON 404 for anything outside the route table.
pub async fn fallback_handler(uri: Uri) -> Response {
    let body = ErrorResponse::from_status(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
    );
    (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
}
