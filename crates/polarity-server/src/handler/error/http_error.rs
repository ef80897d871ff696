//! Error returned by handlers and middleware, rendered as a JSON body.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Detail text: a literal, or built at runtime.
pub type Detail = Cow<'static, str>;

/// A failed request.
///
/// The [`ErrorKind`] picks the status code, the `name` field and the base
/// message; the optional details refine the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "errors do nothing unless returned"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Detail>,
    resource: Option<Detail>,
    context: Option<Detail>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }

    /// Appends a caller-facing explanation to the kind's base message.
    pub fn with_message(mut self, message: impl Into<Detail>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the request field or artifact the error is about.
    pub fn with_resource(mut self, resource: impl Into<Detail>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attaches diagnostic detail, such as the underlying error.
    pub fn with_context(mut self, context: impl Into<Detail>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the JSON body this error renders as.
    pub fn to_body(&self) -> ErrorResponse {
        let message = match &self.message {
            Some(message) => format!("{}. {message}", self.kind.base_message()),
            None => self.kind.base_message().to_owned(),
        };

        ErrorResponse {
            name: self.kind.name().to_owned(),
            message,
            resource: self.resource.as_deref().map(str::to_owned),
            context: self.context.as_deref().map(str::to_owned),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.kind.status_code().as_u16())?;

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " [resource: {resource}]")?;
        }
        if let Some(context) = &self.context {
            write!(f, " - {context}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.kind.status_code(), self.to_body()).into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Handler result whose error renders as a JSON error body.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every kind of failure the API reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required body field is absent or null.
    MissingParam,
    /// A body field has the wrong JSON type.
    InvalidParam,
    /// The body is not a JSON object of the expected shape.
    BadRequest,
    /// No route matches the request.
    NotFound,
    /// The request failed for a reason the caller cannot fix.
    #[default]
    InternalServerError,
    /// An artifact the prediction needs cannot be loaded.
    ServiceUnavailable,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::MissingParam | Self::InvalidParam | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the `name` field of the JSON body.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingParam => "missing_param",
            Self::InvalidParam => "invalid_param",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Returns the message every error of this kind starts with.
    pub fn base_message(self) -> &'static str {
        match self {
            Self::MissingParam => "Invalid request: missing required parameter",
            Self::InvalidParam => "Invalid request: a parameter has the wrong type",
            Self::BadRequest => "The request could not be processed due to invalid data",
            Self::NotFound => "The requested resource was not found",
            Self::InternalServerError => "An internal server error occurred. Please try again later",
            Self::ServiceUnavailable => "The service is temporarily unable to handle the request",
        }
    }

    #[inline]
    pub fn with_message(self, message: impl Into<Detail>) -> Error {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource(self, resource: impl Into<Detail>) -> Error {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn with_context(self, context: impl Into<Detail>) -> Error {
        Error::new(self).with_context(context)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_internal() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn body_appends_the_message_to_the_base() {
        let body = ErrorKind::InvalidParam
            .with_message("expected a string, got a number")
            .with_resource("text")
            .to_body();

        assert_eq!(body.name, "invalid_param");
        assert_eq!(
            body.message,
            "Invalid request: a parameter has the wrong type. expected a string, got a number"
        );
        assert_eq!(body.resource.as_deref(), Some("text"));
        assert_eq!(body.context, None);
    }

    #[test]
    fn display_lists_every_detail() {
        let error = ErrorKind::MissingParam
            .with_message("text is required")
            .with_resource("text")
            .with_context("body field");

        assert_eq!(
            error.to_string(),
            "missing_param (400): text is required [resource: text] - body field"
        );
    }

    #[test]
    fn runtime_details_are_owned() {
        let model = String::from("model");
        let error = ErrorKind::ServiceUnavailable.with_resource(model.clone());
        drop(model);

        assert_eq!(error.resource(), Some("model"));
    }

    #[test]
    fn status_families() {
        for kind in [
            ErrorKind::MissingParam,
            ErrorKind::InvalidParam,
            ErrorKind::BadRequest,
            ErrorKind::NotFound,
        ] {
            assert!(kind.status_code().is_client_error());
        }

        for kind in [ErrorKind::InternalServerError, ErrorKind::ServiceUnavailable] {
            assert!(kind.status_code().is_server_error());
        }
    }
}
