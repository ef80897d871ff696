//! Storage configuration types.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::{StorageError, StorageResult};

/// Storage backend type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// A local directory acting as the remote location.
    #[default]
    Fs,
    /// In-process memory, lost on exit.
    Memory,
    /// Amazon S3 compatible storage.
    S3,
    /// Google Cloud Storage.
    Gcs,
}

/// Remote storage configuration.
///
/// The `bucket` names the single location all artifacts are mirrored to: an
/// S3/GCS bucket, or a directory for the `fs` backend. It is required; an
/// unset bucket is rejected by [`StorageConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Storage backend holding the remote copies of artifacts.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "STORAGE_BACKEND", value_enum, default_value = "fs")
    )]
    #[serde(default)]
    pub backend_type: BackendType,

    /// Bucket (or directory, for the fs backend) holding the remote artifacts.
    #[cfg_attr(feature = "config", arg(long, env = "PROJECT_BUCKET"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Region of the bucket.
    #[cfg_attr(feature = "config", arg(long = "storage-region", env = "STORAGE_REGION"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint URL (for S3-compatible storage like MinIO, R2).
    #[cfg_attr(feature = "config", arg(long = "storage-endpoint", env = "STORAGE_ENDPOINT"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access key ID.
    #[cfg_attr(feature = "config", arg(long = "storage-access-key-id", env = "STORAGE_ACCESS_KEY_ID"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// Secret access key.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-secret-access-key", env = "STORAGE_SECRET_ACCESS_KEY")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Creates a new storage configuration for the given backend and bucket.
    pub fn new(backend_type: BackendType, bucket: impl Into<String>) -> Self {
        Self {
            backend_type,
            bucket: Some(bucket.into()),
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Creates an in-memory configuration, mainly for tests.
    pub fn memory(bucket: impl Into<String>) -> Self {
        Self::new(BackendType::Memory, bucket)
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self.backend_type {
            BackendType::Fs => "fs",
            BackendType::Memory => "memory",
            BackendType::S3 => "s3",
            BackendType::Gcs => "gcs",
        }
    }

    /// Validates the configuration and returns the bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the bucket is unset or blank.
    pub fn validate(&self) -> StorageResult<&str> {
        match self.bucket.as_deref().map(str::trim) {
            Some(bucket) if !bucket.is_empty() => Ok(bucket),
            _ => Err(StorageError::configuration(
                "PROJECT_BUCKET is not set: a bucket or location is required",
            )),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend_type: BackendType::default(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bucket_is_rejected() {
        assert!(StorageConfig::default().validate().is_err());

        let mut config = StorageConfig::memory("   ");
        assert!(matches!(config.validate(), Err(StorageError::Configuration(_))));

        config.bucket = Some("artifacts".to_owned());
        assert_eq!(config.validate().ok(), Some("artifacts"));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let config = StorageConfig::new(BackendType::S3, "artifacts")
            .with_region("eu-west-1")
            .with_endpoint("http://localhost:9000")
            .with_credentials("key", "secret");

        assert_eq!(config.backend_name(), "s3");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.secret_access_key.as_deref(), Some("secret"));
    }
}
