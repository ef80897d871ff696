//! Liveness check.

use axum::Router;
use axum::routing::get;

use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "polarity_server::handler::monitors";

async fn health_status() -> &'static str {
    tracing::trace!(target: TRACING_TARGET, "Health status check requested");
    "OK"
}

/// Returns a [`Router`] with the health check route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", get(health_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn health_status_is_plain_text() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes)?;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("OK");
        assert!(response.header("content-type").to_str()?.starts_with("text/plain"));

        Ok(())
    }
}
