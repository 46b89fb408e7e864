use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{reason_phrase, ErrorResponse};
use crate::Environment;

/// Rewrites non-JSON 4xx/5xx responses into an [`ErrorResponse`] body.
///
/// Handlers already answering with JSON pass through untouched. Plain-text
/// bodies become the `message`; in production they are replaced by the
/// reason phrase so framework internals do not leak.
#[derive(Debug, Clone, Copy)]
pub struct JsonErrorLayer {
    environment: Environment,
}

impl JsonErrorLayer {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl<S> Layer<S> for JsonErrorLayer {
    type Service = JsonErrorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JsonErrorService {
            inner,
            environment: self.environment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonErrorService<S> {
    inner: S,
    environment: Environment,
}

fn is_json(response: &Response<impl Sized>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

impl<S, B> Service<Request<Body>> for JsonErrorService<S>
where
    S: Service<Request<Body>, Response = Response<B>> + Clone + Send + 'static,
    S::Future: Send,
    B: axum::body::HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Call the instance that was driven to readiness, leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let hide_details = self.environment.is_production();

        Box::pin(async move {
            let response = inner.call(req).await?;
            let status = response.status();

            if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
                return Ok(response.map(Body::new));
            }

            let (mut parts, body) = response.into_parts();
            let text = match body.collect().await {
                Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
                Err(_) => String::new(),
            };

            let message = if hide_details || text.trim().is_empty() {
                reason_phrase(status).to_string()
            } else {
                text
            };

            let mut rewritten =
                (status, axum::Json(ErrorResponse::from_status(status, message))).into_response();

            // Keep headers such as x-request-id and allow, but not the ones
            // describing the discarded body.
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.remove(header::CONTENT_ENCODING);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            *rewritten.headers_mut() = parts.headers;

            Ok(rewritten)
        })
    }
}
