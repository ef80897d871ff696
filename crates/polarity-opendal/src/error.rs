//! Failures of the OpenDAL artifact store.

use crate::config::BackendType;

/// Result of a storage call.
pub type StorageResult<T> = Result<T, StorageError>;

/// A storage call that could not be completed.
///
/// Request failures carry the object key they were made for, so the caller
/// can report which artifact was affected without re-threading it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The bucket is unset or unusable.
    #[error("invalid storage configuration: {0}")]
    Configuration(String),

    /// The operator for the bucket could not be built.
    #[error("cannot open {backend} storage: {source}")]
    Unavailable {
        backend: BackendType,
        #[source]
        source: opendal::Error,
    },

    /// The binary was compiled without the backend's feature.
    #[error("{0} storage is not compiled into this build")]
    Unsupported(BackendType),

    /// No object is stored under the key.
    #[error("object `{key}` does not exist")]
    Missing {
        key: String,
        #[source]
        source: opendal::Error,
    },

    /// The credentials may not touch the key.
    #[error("access to `{key}` was denied")]
    Denied {
        key: String,
        #[source]
        source: opendal::Error,
    },

    /// Any other failure reported by the service.
    #[error("storage request for `{key}` failed: {source}")]
    Request {
        key: String,
        #[source]
        source: opendal::Error,
    },
}

impl StorageError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Sorts a failed request for `key` by what the service reported.
    pub fn request(key: impl Into<String>, source: opendal::Error) -> Self {
        let key = key.into();
        match source.kind() {
            opendal::ErrorKind::NotFound => Self::Missing { key, source },
            opendal::ErrorKind::PermissionDenied => Self::Denied { key, source },
            _ => Self::Request { key, source },
        }
    }

    /// Returns `true` when the object does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// Returns the object key a request failure is about.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Missing { key, .. } | Self::Denied { key, .. } | Self::Request { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

impl From<StorageError> for polarity_core::Error {
    fn from(err: StorageError) -> Self {
        let error = match &err {
            StorageError::Configuration(_)
            | StorageError::Unavailable { .. }
            | StorageError::Unsupported(_) => Self::configuration(),
            StorageError::Missing { .. } => Self::remote_not_found(),
            StorageError::Denied { .. } | StorageError::Request { .. } => Self::storage(),
        };

        error.with_message(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use polarity_core::ErrorKind;

    use super::*;

    #[test]
    fn requests_are_sorted_by_service_kind() {
        let missing = StorageError::request(
            "model.json",
            opendal::Error::new(opendal::ErrorKind::NotFound, "no such object"),
        );
        assert!(missing.is_missing());
        assert_eq!(missing.key(), Some("model.json"));

        let denied = StorageError::request(
            "model.json",
            opendal::Error::new(opendal::ErrorKind::PermissionDenied, "forbidden"),
        );
        assert!(matches!(denied, StorageError::Denied { .. }));

        let other = StorageError::request(
            "model.json",
            opendal::Error::new(opendal::ErrorKind::Unexpected, "connection reset"),
        );
        assert!(other.to_string().contains("connection reset"));
    }

    #[test]
    fn missing_objects_become_remote_not_found() {
        let err = StorageError::request(
            "tokenizer.json",
            opendal::Error::new(opendal::ErrorKind::NotFound, "no such object"),
        );

        let core = polarity_core::Error::from(err);
        assert_eq!(core.kind(), ErrorKind::RemoteNotFound);
        assert!(core.to_string().contains("tokenizer.json"));
    }

    #[test]
    fn setup_failures_become_configuration() {
        let core = polarity_core::Error::from(StorageError::configuration("bucket is not set"));
        assert_eq!(core.kind(), ErrorKind::Configuration);
        assert!(core.to_string().contains("bucket is not set"));

        let core = polarity_core::Error::from(StorageError::Unsupported(BackendType::Memory));
        assert_eq!(core.kind(), ErrorKind::Configuration);
    }
}
