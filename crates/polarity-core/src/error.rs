//! Common error type definitions.

use std::fmt;

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

use crate::ArtifactKind;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// This type is commonly used as a source error in structured error types,
/// providing a way to wrap any error that implements the standard `Error` trait
/// while maintaining Send and Sync bounds for multi-threaded contexts.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in polarity operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The remote location is unset or does not exist.
    Configuration,
    /// An artifact could not be resolved into the in-memory cache.
    ArtifactUnavailable,
    /// The remote copy of an artifact does not exist.
    ArtifactMissing,
    /// The local copy of an artifact does not exist.
    LocalArtifactMissing,
    /// A remote key was not found by the blob store.
    RemoteNotFound,
    /// A local file was not found by the blob store.
    LocalNotFound,
    /// The blob store backend failed.
    Storage,
    /// Local filesystem operation failed.
    FileSystem,
    /// Serialization/deserialization failed.
    Serialization,
    /// Input validation failed.
    InvalidInput,
    /// Network transfer failed.
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A structured error type for polarity operations.
#[derive(Debug, Error)]
#[error(
    "{kind}{}{}",
    artifact.map(|a| format!(" ({a})")).unwrap_or_default(),
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
)]
pub struct Error {
    kind: ErrorKind,
    artifact: Option<ArtifactKind>,
    message: Option<String>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            artifact: None,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Names the artifact this error is about.
    pub fn with_artifact(mut self, artifact: ArtifactKind) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new artifact unavailable error for the given artifact.
    pub fn artifact_unavailable(artifact: ArtifactKind) -> Self {
        Self::new(ErrorKind::ArtifactUnavailable).with_artifact(artifact)
    }

    /// Creates a new artifact missing error for the given artifact.
    pub fn artifact_missing(artifact: ArtifactKind) -> Self {
        Self::new(ErrorKind::ArtifactMissing).with_artifact(artifact)
    }

    /// Creates a new local artifact missing error for the given artifact.
    pub fn local_artifact_missing(artifact: ArtifactKind) -> Self {
        Self::new(ErrorKind::LocalArtifactMissing).with_artifact(artifact)
    }

    /// Creates a new remote not found error.
    pub fn remote_not_found() -> Self {
        Self::new(ErrorKind::RemoteNotFound)
    }

    /// Creates a new local not found error.
    pub fn local_not_found() -> Self {
        Self::new(ErrorKind::LocalNotFound)
    }

    /// Creates a new storage error.
    pub fn storage() -> Self {
        Self::new(ErrorKind::Storage)
    }

    /// Creates a new file system error.
    pub fn file_system() -> Self {
        Self::new(ErrorKind::FileSystem)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new network error.
    pub fn network() -> Self {
        Self::new(ErrorKind::Network)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the artifact this error is about, if any.
    pub fn artifact(&self) -> Option<ArtifactKind> {
        self.artifact
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::file_system()
            .with_message(err.to_string())
            .with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(err.to_string())
            .with_source(err)
    }
}
