//! Process signals that stop the server.

use strum::Display;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// The signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShutdownSignal {
    /// SIGINT, usually Ctrl+C in a terminal.
    #[strum(serialize = "SIGINT")]
    Interrupt,
    /// SIGTERM, sent by process supervisors.
    #[strum(serialize = "SIGTERM")]
    Terminate,
}

/// Resolves with the first SIGINT or SIGTERM the process receives.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still does.
pub async fn wait_for_signal() -> ShutdownSignal {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => ShutdownSignal::Interrupt,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for SIGINT"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                ShutdownSignal::Terminate
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<ShutdownSignal>();

    tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
    }
}
