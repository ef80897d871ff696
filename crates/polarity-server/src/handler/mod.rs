//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod predictions;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::PredictionRequest;
pub use crate::handler::response::ErrorResponse;
pub use crate::handler::response::PredictionResponse;
use crate::service::ServiceState;

/// Answers unknown routes with a JSON `not_found` body.
async fn not_found() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and the not-found fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(monitors::routes())
        .merge(predictions::routes())
        .fallback(not_found)
}
