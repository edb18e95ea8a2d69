//! The wait state.
//!
//! When nothing more can be automated the launcher parks itself so the
//! container stays up for an operator. It still honors SIGTERM/SIGINT: as
//! PID 1 it would otherwise ignore `docker stop` until SIGKILL.

/// Block until the process is asked to terminate.
pub async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = terminate.recv() => tracing::info!("SIGTERM received; leaving wait state"),
                    () = interrupt() => tracing::info!("SIGINT received; leaving wait state"),
                }
            }
            Err(err) => {
                tracing::warn!("cannot listen for SIGTERM: {err}");
                interrupt().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await;
        tracing::info!("interrupt received; leaving wait state");
    }
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed.
async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for interrupts: {err}; waiting indefinitely");
        std::future::pending::<()>().await;
    }
}
