use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Resolves once SIGINT or SIGTERM is received and the drain delay has
/// elapsed. Pass to `axum::serve(..).with_graceful_shutdown(..)`.
pub async fn shutdown_signal(wait_before_close: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, stopping"),
        _ = terminate => info!("Received SIGTERM, stopping"),
    }

    drain(wait_before_close).await;
    info!("Closing server");
}

async fn drain(wait_before_close: Duration) {
    if !wait_before_close.is_zero() {
        info!(
            wait_secs = wait_before_close.as_secs(),
            "Waiting before closing server"
        );
        tokio::time::sleep(wait_before_close).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_waits_for_configured_delay() {
        let started = tokio::time::Instant::now();
        drain(Duration::from_millis(20)).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_drain_without_delay_returns_immediately() {
        drain(Duration::ZERO).await;
    }
}
