mod json_error;
mod trace;

use axum::http::StatusCode;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[cfg(feature = "compression")]
use tower_http::compression::CompressionLayer;

#[cfg(feature = "cors")]
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::ServiceConfig;

pub use json_error::JsonErrorLayer;
pub use trace::{RequestSpan, ResponseLog};

/// Wraps the route table in the service middleware.
///
/// Responses pass outward through: catch-panic, request id, trace, timeout,
/// compression, CORS, JSON errors. `JsonErrorLayer` is added last so that
/// it also sees the panics, timeouts and rejections produced further in.
pub(crate) fn default_layers(router: Router, config: &ServiceConfig) -> Router {
    let router = router
        .layer(CatchPanicLayer::new())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan)
                .on_request(())
                .on_response(ResponseLog)
                .on_failure(()),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ));

    #[cfg(feature = "compression")]
    let router = router.layer(CompressionLayer::new());

    #[cfg(feature = "cors")]
    let router = match cors_layer(&config.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(JsonErrorLayer::new(config.environment))
}

#[cfg(feature = "cors")]
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "skipping invalid CORS origin");
                None
            }
        }))
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn propagates_caller_request_id() {
        let app = default_layers(
            Router::new().route("/", get(|| async { "ok" })),
            &ServiceConfig::default(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "caller-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "caller-123");
    }

    #[tokio::test]
    async fn generates_request_id_when_absent() {
        let app = default_layers(
            Router::new().route("/", get(|| async { "ok" })),
            &ServiceConfig::default(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get("x-request-id").unwrap();
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn panics_become_json_500() {
        async fn boom() -> &'static str {
            panic!("handler exploded")
        }

        let app = default_layers(Router::new().route("/", get(boom)), &ServiceConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[cfg(feature = "cors")]
    #[test]
    fn cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["*".to_string()]).is_some());
    }
}
