use anyhow::{Context, Result};
use google_drive_connector::config::{server_defaults, GoogleOAuthConfig, SyncSettings};
use google_drive_connector::{create_app, GoogleDriveConnector};
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

    info!("Google Drive connector starting...");

    let oauth = GoogleOAuthConfig::from_env()?;
    let settings = SyncSettings::from_env(config.page_size);

    info!(
        port = config.port,
        page_size = settings.page_size,
        max_sync_size_bytes = settings.max_sync_size_bytes,
        max_concurrent_connections = config.max_concurrent_connections,
        "Configuration loaded"
    );

    let connector = Arc::new(GoogleDriveConnector::from_settings(
        settings,
        oauth,
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

    info!("Google Drive connector stopped");
    Ok(())
}
