use anyhow::{Context, Result};
use chargebee_connector::config::server_defaults;
use chargebee_connector::{create_app, ChargebeeConnector};
use std::sync::Arc;
use std::time::Duration;
use sync_connector::shutdown::shutdown_signal;
use sync_connector::telemetry::init_tracing;
use sync_connector::ServerConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load(server_defaults()).context("Failed to load configuration")?;
    init_tracing(env!("CARGO_PKG_NAME"), &config.log_level);

    info!("Chargebee connector starting...");
    info!(
        port = config.port,
        page_size = config.page_size,
        max_concurrent_connections = config.max_concurrent_connections,
        api_version = config.api_version,
        "Configuration loaded"
    );

    let connector = Arc::new(ChargebeeConnector::from_settings(
        config.page_size,
        config.api_version,
        config.max_concurrent_connections,
    )?);
    let app = create_app(connector, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .context("Failed to bind connector port")?;
    info!(port = config.port, "Connector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Duration::from_secs(
            config.wait_before_server_close_secs,
        )))
        .await
        .context("Server error")?;

    info!("Chargebee connector stopped");
    Ok(())
}
