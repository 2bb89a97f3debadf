//! Graceful shutdown handling.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `shutdown` on Ctrl-C or, on Unix, SIGTERM.
///
/// The pipeline observes the token while waiting for the next record, so an
/// in-flight message still completes before the loop exits.
pub fn listen_for_shutdown(shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            signal = wait_for_signal() => {
                match signal {
                    Ok(name) => info!("Received {name}, stopping after the current message"),
                    Err(e) => warn!("Failed to listen for shutdown signals: {e}"),
                }
                shutdown.cancel();
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

/// Shuts down background tasks gracefully.
///
/// Cancels `cancel` and awaits the given tasks so their last log lines are
/// written before the summary.
pub async fn shutdown_gracefully(cancel: CancellationToken, tasks: Vec<JoinHandle<()>>) {
    cancel.cancel();
    for task in tasks {
        let _ = task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_exits_when_token_cancelled() {
        let token = CancellationToken::new();
        let listener = listen_for_shutdown(token.clone());
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener should exit")
            .expect("listener should not panic");
    }

    #[tokio::test]
    async fn test_shutdown_gracefully_awaits_tasks() {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let task = tokio::spawn(async move { child.cancelled().await });
        shutdown_gracefully(cancel.clone(), vec![task]).await;
        assert!(cancel.is_cancelled());
    }
}
