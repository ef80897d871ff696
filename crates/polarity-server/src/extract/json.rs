//! JSON body extractor with structured rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Longest rejection detail echoed back to the caller, in characters.
const MAX_DETAIL_CHARS: usize = 200;

/// [`axum::Json`] whose rejections answer with the server's JSON error body
/// instead of axum's plain-text one.
///
/// [`axum::Json`]: AxumJson
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <AxumJson<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(_) => "Request body does not have the expected shape",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => {
                "Request must have Content-Type header set to 'application/json'"
            }
            JsonRejection::BytesRejection(_) => "Failed to read request body",
            _ => {
                return ErrorKind::InternalServerError
                    .with_message("Request processing failed")
                    .with_context(rejection.body_text());
            }
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("body")
            .with_context(summarize(&rejection.body_text()))
    }
}

/// Joins the first lines of a rejection and caps its length.
fn summarize(detail: &str) -> String {
    detail
        .lines()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_DETAIL_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_details_are_summarized() {
        let detail = format!("first\nsecond\nthird\nfourth {}", "x".repeat(300));
        let summary = summarize(&detail);

        assert!(summary.starts_with("first second third"));
        assert!(!summary.contains("fourth"));
        assert!(summarize(&"y".repeat(500)).chars().count() <= MAX_DETAIL_CHARS);
    }
}
