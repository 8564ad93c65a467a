use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

/// Resolves on Ctrl+C or SIGTERM.
///
/// When no handler can be installed this never resolves and the daemon has to
/// be killed.
pub(crate) async fn shutdown_signal() {
    match wait_for_signal().await {
        Ok(()) => info!("Shutdown signal received, finishing up"),
        Err(e) => {
            error!("Error while waiting for shutdown signal: {e:#}");
            std::future::pending::<()>().await;
        },
    }
}

async fn wait_for_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
