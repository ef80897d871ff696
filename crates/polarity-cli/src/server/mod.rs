//! HTTP listener, graceful drain and exit reporting.

mod shutdown;

use std::future::{Future, IntoFuture};
use std::io;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use self::shutdown::{ShutdownSignal, wait_for_signal};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    config.log();

    let addr = config.server_addr();
    let listener = TcpListener::bind(addr).await.inspect_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %addr,
            error = %err,
            suggestion = bind_suggestion(err),
            "Failed to bind to address"
        );
    })?;

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Listening on every interface, make sure the port is firewalled"
        );
    }

    serve_until(listener, app, wait_for_signal(), config.shutdown_timeout()).await
}

/// Serves on `listener` until `shutdown` resolves, then drains open
/// connections for at most `drain_timeout`.
async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> io::Result<()>
where
    F: Future<Output = ShutdownSignal> + Send + 'static,
{
    let started = Instant::now();
    let (draining_tx, mut draining_rx) = watch::channel(false);

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %listener.local_addr()?,
        "Server is ready and listening for connections"
    );

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = shutdown.await;
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                signal = %signal,
                drain_timeout_secs = drain_timeout.as_secs(),
                "Shutdown requested, draining connections"
            );
            let _ = draining_tx.send(true);
        })
        .into_future();

    let deadline = async move {
        if draining_rx.wait_for(|draining| *draining).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain_timeout).await;
    };

    let result = tokio::select! {
        result = server => result,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                "Drain deadline exceeded, dropping open connections"
            );
            Ok(())
        }
    };

    let uptime_secs = started.elapsed().as_secs();
    match &result {
        Ok(()) => tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "Shutdown completed"
        ),
        Err(err) => tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            kind = ?err.kind(),
            uptime_secs,
            "Server stopped with an error"
        ),
    }

    result
}

/// Hint logged next to a failed bind.
fn bind_suggestion(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::AddrInUse => "another process holds the port, pick a different --port",
        io::ErrorKind::PermissionDenied => "ports below 1024 need elevated privileges",
        io::ErrorKind::AddrNotAvailable => "the --host address is not assigned to this machine",
        _ => "check the --host and --port settings",
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn stops_when_the_signal_fires() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let app = Router::new().route("/", get(|| async { "OK" }));

        let shutdown = async { ShutdownSignal::Interrupt };
        serve_until(listener, app, shutdown, Duration::from_secs(1)).await?;

        Ok(())
    }

    #[test]
    fn bind_failures_have_hints() {
        let in_use = io::Error::new(io::ErrorKind::AddrInUse, "in use");
        assert!(bind_suggestion(&in_use).contains("--port"));
        assert!(bind_suggestion(&io::Error::other("other")).contains("--host"));
    }
}
