//! Timeouts, handler panics and layer failures as JSON error responses.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};

/// Tracing target for error recovery.
const TRACING_TARGET: &str = "polarity_server::middleware::recovery";

/// Longest request timeout accepted, in seconds.
const MAX_REQUEST_TIMEOUT: u64 = 300;

/// Recovery middleware settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may run before it is answered with a 500.
    #[cfg_attr(feature = "config", arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30))]
    pub request_timeout: u64,
}

impl RecoveryConfig {
    pub fn with_timeout_secs(request_timeout: u64) -> Self {
        Self { request_timeout }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Returns an error message unless the timeout is between 1 and 300 seconds.
    pub fn validate(&self) -> Result<(), String> {
        if (1..=MAX_REQUEST_TIMEOUT).contains(&self.request_timeout) {
            return Ok(());
        }

        Err(format!(
            "request timeout of {}s is out of range, use 1 to {MAX_REQUEST_TIMEOUT} seconds",
            self.request_timeout
        ))
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(30)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Answers timed out requests, handler panics and layer errors with a
    /// JSON `internal_server_error` body.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        self.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_error))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
    }
}

async fn handle_error(err: BoxError) -> Error {
    if err.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET, "Request timed out");

        return ErrorKind::InternalServerError
            .with_message("Request timeout")
            .with_context("The request took too long to process and was terminated");
    }

    tracing::error!(target: TRACING_TARGET, error = %err, "Middleware failed");
    ErrorKind::InternalServerError
        .with_message("An unexpected error occurred")
        .with_context(err.to_string())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    // Handlers may panic with a ready-made error to control the response.
    if let Some(error) = payload.downcast_ref::<Error>() {
        tracing::error!(target: TRACING_TARGET, error = %error, "Handler panicked");
        return error.clone().into_response();
    }

    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(target: TRACING_TARGET, panic = %message, "Handler panicked");

    ErrorKind::InternalServerError
        .with_message("An unexpected panic occurred")
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;
    use crate::handler::ErrorResponse;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    async fn panics() -> &'static str {
        panic!("handler exploded")
    }

    fn app(config: &RecoveryConfig) -> Router {
        Router::new()
            .route("/slow", get(slow))
            .route("/panic", get(panics))
            .with_recovery(config)
    }

    #[tokio::test]
    async fn timeouts_become_json_errors() -> anyhow::Result<()> {
        let server = TestServer::new(app(&RecoveryConfig::with_timeout_secs(0)))?;

        let response = server.get("/slow").await;
        response.assert_status_internal_server_error();
        let body = response.json::<ErrorResponse>();
        assert_eq!(body.name, "internal_server_error");
        assert!(body.message.contains("Request timeout"));

        Ok(())
    }

    #[tokio::test]
    async fn panics_become_json_errors() -> anyhow::Result<()> {
        let server = TestServer::new(app(&RecoveryConfig::default()))?;

        let response = server.get("/panic").await;
        response.assert_status_internal_server_error();
        assert_eq!(response.json::<ErrorResponse>().name, "internal_server_error");

        Ok(())
    }

    #[test]
    fn timeout_must_be_in_range() {
        assert_eq!(RecoveryConfig::default().request_timeout(), Duration::from_secs(30));
        assert!(RecoveryConfig::default().validate().is_ok());
        assert!(RecoveryConfig::with_timeout_secs(0).validate().is_err());
        assert!(RecoveryConfig::with_timeout_secs(301).validate().is_err());
    }
}
