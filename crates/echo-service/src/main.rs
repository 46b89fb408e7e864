use echo_service::{RouterExt, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "starting {}",
        config.service_name
    );

    if let Err(err) = echo_service::app(&config).serve(&config).await {
        tracing::error!(error = %err, "server failed");
        return Err(err.into());
    }

    Ok(())
}
