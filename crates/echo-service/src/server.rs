//! Listener lifecycle.

use axum::Router;
use std::future::Future;
use std::{fmt, io};
use tokio::net::TcpListener;

use crate::ServiceConfig;

/// Failure to start or keep serving. Either one ends the process.
#[derive(Debug)]
pub enum ServerError {
    /// The configured address could not be bound.
    Bind { addr: String, source: io::Error },
    /// The accept loop failed after binding.
    Runtime(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "failed to bind {}: {}", addr, source),
            Self::Runtime(e) => write!(f, "server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::Runtime(e) => Some(e),
        }
    }
}

/// Bind `config.addr()` and serve until SIGINT or SIGTERM, then drain.
pub async fn serve_router(router: Router, config: &ServiceConfig) -> Result<(), ServerError> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    serve_with_shutdown(listener, router, shutdown_signal()).await
}

/// Serve on an already bound listener until `signal` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr().map_err(ServerError::Runtime)?;
    tracing::info!(addr = %local, "listening");
    tracing::info!("health check: http://localhost:{}/health", local.port());

    axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await
        .map_err(ServerError::Runtime)?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT or (unix) SIGTERM. If a handler cannot be installed
/// that signal is never observed; the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
