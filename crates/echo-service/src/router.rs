//! Route table assembly.

use axum::Router;

use crate::routes::{echo_routes, fallback_handler, health_routes, info_routes};
use crate::ServiceConfig;

/// Chainable helpers for assembling the service on an axum `Router`.
///
/// ```rust,ignore
/// use echo_service::{RouterExt, ServiceConfig};
///
/// let config = ServiceConfig::load()?;
/// Router::new()
///     .with_info(&config.service_name)
///     .with_health_check()
///     .with_echo(config.max_body_bytes)
///     .with_fallback()
///     .with_default_layers(&config)
///     .serve(&config)
///     .await?;
/// ```
pub trait RouterExt: Sized {
    /// Adds `GET /` describing the service.
    fn with_info(self, service_name: &str) -> Self;

    /// Adds `GET /health`.
    fn with_health_check(self) -> Self;

    /// Adds `POST /api/echo`, rejecting bodies over `body_limit` bytes.
    fn with_echo(self, body_limit: Option<usize>) -> Self;

    /// Adds a JSON 404 for unmatched paths.
    fn with_fallback(self) -> Self;

    /// Applies the middleware stack (see [`crate::layer`]).
    fn with_default_layers(self, config: &impl AsRef<ServiceConfig>) -> Self;

    /// Binds `config.addr()` and serves until SIGINT or SIGTERM.
    fn serve(
        self,
        config: &(impl AsRef<ServiceConfig> + Sync),
    ) -> impl std::future::Future<Output = Result<(), crate::ServerError>> + Send;
}

impl RouterExt for Router {
    fn with_info(self, service_name: &str) -> Self {
        self.merge(info_routes(service_name))
    }

    fn with_health_check(self) -> Self {
        self.merge(health_routes())
    }

    fn with_echo(self, body_limit: Option<usize>) -> Self {
        self.merge(echo_routes(body_limit))
    }

    fn with_fallback(self) -> Self {
        self.fallback(fallback_handler)
    }

    fn with_default_layers(self, config: &impl AsRef<ServiceConfig>) -> Self {
        crate::layer::default_layers(self, config.as_ref())
    }

    async fn serve(
        self,
        config: &(impl AsRef<ServiceConfig> + Sync),
    ) -> Result<(), crate::ServerError> {
        crate::server::serve_router(self, config.as_ref()).await
    }
}

/// The complete service: three routes, JSON 404, middleware.
pub fn app(config: &ServiceConfig) -> Router {
    Router::new()
        .with_info(&config.service_name)
        .with_health_check()
        .with_echo(config.max_body_bytes)
        .with_fallback()
        .with_default_layers(config)
}
