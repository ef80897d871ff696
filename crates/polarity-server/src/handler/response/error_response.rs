use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// JSON body of every failed request.
///
/// The status code travels in the response line only.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable snake_case identifier of the error kind.
    pub name: String,
    /// Message safe to show to the caller.
    pub message: String,
    /// Request field or artifact the error is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Diagnostic detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl IntoResponse for ErrorResponse {
    #[inline]
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
