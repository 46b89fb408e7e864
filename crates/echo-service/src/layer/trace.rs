//! Per-request tracing.

use axum::extract::MatchedPath;
use axum::http::{HeaderMap, Request, Response};
use std::time::Duration;
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Span;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Opens an `http` span per request.
///
/// `route` is the matched route template, or `-` when the request fell
/// through to the 404 handler. `status` is recorded by [`ResponseLog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http",
            method = %request.method(),
            path = %request.uri().path(),
            route = route_label(request),
            request_id = request_id(request.headers()),
            status = tracing::field::Empty,
        )
    }
}

fn route_label<B>(request: &Request<B>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or("-", MatchedPath::as_str)
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Logs each response: ERROR for 5xx, INFO otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseLog;

impl<B> OnResponse<B> for ResponseLog {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status().as_u16();
        let latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        span.record("status", status);

        if response.status().is_server_error() {
            tracing::error!(status, latency_us, "request failed");
        } else {
            tracing::info!(status, latency_us, "request finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request as AxumRequest;
    use axum::http::HeaderValue;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn request_id_falls_back_to_dash() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "-");

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-1"));
        assert_eq!(request_id(&headers), "abc-1");

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_bytes(b"\xff").unwrap());
        assert_eq!(request_id(&headers), "-");
    }

    #[test]
    fn unmatched_request_has_no_route() {
        let request = Request::builder().uri("/nope").body(()).unwrap();
        assert_eq!(route_label(&request), "-");
    }

    #[tokio::test]
    async fn matched_request_reports_route_template() {
        let app = Router::new().route(
            "/items/{id}",
            get(|req: AxumRequest| async move { route_label(&req).to_owned() }),
        );

        let response = app
            .oneshot(Request::builder().uri("/items/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"/items/{id}");
    }

    #[test]
    fn response_log_handles_every_status_class() {
        let span = tracing::info_span!("http", status = tracing::field::Empty);
        for code in [200, 404, 500, 503] {
            let response = Response::builder().status(code).body(()).unwrap();
            ResponseLog.on_response(&response, Duration::from_micros(150), &span);
        }
    }
}
