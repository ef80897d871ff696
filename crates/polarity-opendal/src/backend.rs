//! Artifact store over an OpenDAL operator.

use std::path::Path;

use async_trait::async_trait;
use opendal::{Operator, services};
use polarity_core::{BlobStore, write_atomic};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Blob store that wraps a single OpenDAL operator rooted at the configured bucket.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
    location: String,
}

impl StorageBackend {
    /// Opens the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if no bucket is configured and
    /// [`StorageError::Unavailable`] if the operator cannot be built.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let location = config.validate()?.to_owned();
        let operator = open_operator(&config, &location)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            location = %location,
            "Artifact store opened"
        );

        Ok(Self {
            operator,
            config,
            location,
        })
    }

    /// Returns the service this backend talks to.
    pub fn backend_type(&self) -> BackendType {
        self.config.backend_type
    }

    /// Reads the whole object stored under `key`.
    pub async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let buffer = self
            .operator
            .read(key)
            .await
            .map_err(|err| StorageError::request(key, err))?;

        tracing::debug!(target: TRACING_TARGET, key, size = buffer.len(), "Object read");
        Ok(buffer.to_vec())
    }

    /// Replaces the object stored under `key`.
    pub async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let size = data.len();
        self.operator
            .write(key, data)
            .await
            .map_err(|err| StorageError::request(key, err))?;

        tracing::debug!(target: TRACING_TARGET, key, size, "Object written");
        Ok(())
    }
}

/// Builds the operator for the configured service, rooted at `location`.
#[allow(unreachable_patterns)]
fn open_operator(config: &StorageConfig, location: &str) -> StorageResult<Operator> {
    let backend = config.backend_type;
    let finish = |built: opendal::Result<Operator>| {
        built.map_err(|source| StorageError::Unavailable { backend, source })
    };

    match backend {
        BackendType::Fs => {
            finish(Operator::new(services::Fs::default().root(location)).map(|b| b.finish()))
        }
        // Each memory operator owns its own map, so the bucket name is only a label.
        BackendType::Memory => {
            finish(Operator::new(services::Memory::default().root("/")).map(|b| b.finish()))
        }
        #[cfg(feature = "s3")]
        BackendType::S3 => {
            let mut builder = services::S3::default().bucket(location);
            if let Some(region) = config.region.as_deref() {
                builder = builder.region(region);
            }
            if let Some(endpoint) = config.endpoint.as_deref() {
                builder = builder.endpoint(endpoint);
            }
            if let Some(key_id) = config.access_key_id.as_deref() {
                builder = builder.access_key_id(key_id);
            }
            if let Some(secret) = config.secret_access_key.as_deref() {
                builder = builder.secret_access_key(secret);
            }
            finish(Operator::new(builder).map(|b| b.finish()))
        }
        #[cfg(feature = "gcs")]
        BackendType::Gcs => {
            let mut builder = services::Gcs::default().bucket(location);
            if let Some(endpoint) = config.endpoint.as_deref() {
                builder = builder.endpoint(endpoint);
            }
            finish(Operator::new(builder).map(|b| b.finish()))
        }
        unsupported => Err(StorageError::Unsupported(unsupported)),
    }
}

#[async_trait]
impl BlobStore for StorageBackend {
    fn location(&self) -> &str {
        &self.location
    }

    async fn location_exists(&self) -> polarity_core::Result<bool> {
        match self.operator.check().await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == opendal::ErrorKind::NotFound => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    location = %self.location,
                    error = %err,
                    "Storage location does not exist"
                );
                Ok(false)
            }
            Err(err) => Err(StorageError::request(&self.location, err).into()),
        }
    }

    async fn exists(&self, key: &str) -> polarity_core::Result<bool> {
        self.operator
            .exists(key)
            .await
            .map_err(|err| StorageError::request(key, err).into())
    }

    async fn get(&self, key: &str, local_path: &Path) -> polarity_core::Result<()> {
        let data = self.read(key).await.map_err(|err| {
            if err.is_missing() {
                polarity_core::Error::remote_not_found()
                    .with_message(format!("{}/{key} does not exist", self.location))
                    .with_source(err)
            } else {
                err.into()
            }
        })?;

        write_atomic(local_path, &data).await?;

        tracing::info!(
            target: TRACING_TARGET,
            key = %key,
            path = %local_path.display(),
            size = data.len(),
            "Object downloaded"
        );

        Ok(())
    }

    async fn put(&self, local_path: &Path, key: &str) -> polarity_core::Result<()> {
        let data = match tokio::fs::read(local_path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(polarity_core::Error::local_not_found()
                    .with_message(format!("{} does not exist", local_path.display()))
                    .with_source(err));
            }
            Err(err) => return Err(err.into()),
        };
        let size = data.len();

        self.write(key, data).await?;

        tracing::info!(
            target: TRACING_TARGET,
            key = %key,
            path = %local_path.display(),
            size,
            "Object uploaded"
        );

        Ok(())
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend_type", &self.backend_type())
            .field("location", &self.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use polarity_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn put_then_get_through_memory_backend() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StorageBackend::new(StorageConfig::memory("artifacts"))?;

        let source = dir.path().join("model.json");
        tokio::fs::write(&source, b"{\"weights\":[]}").await?;

        assert!(store.location_exists().await?);
        assert!(!store.exists("model.json").await?);

        store.put(&source, "model.json").await?;
        assert!(store.exists("model.json").await?);

        let target = dir.path().join("hydrated").join("model.json");
        store.get("model.json", &target).await?;
        assert_eq!(tokio::fs::read(&target).await?, b"{\"weights\":[]}");

        Ok(())
    }

    #[tokio::test]
    async fn get_missing_key_fails_without_touching_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StorageBackend::new(StorageConfig::memory("artifacts"))?;
        let target = dir.path().join("tokenizer.json");

        let err = store.get("tokenizer.json", &target).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteNotFound);
        assert!(!target.exists());

        Ok(())
    }

    #[tokio::test]
    async fn put_missing_file_fails_with_local_not_found() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StorageBackend::new(StorageConfig::memory("artifacts"))?;

        let err = store
            .put(&dir.path().join("absent.json"), "absent.json")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalNotFound);
        assert!(!store.exists("absent.json").await?);

        Ok(())
    }

    #[tokio::test]
    async fn fs_backend_stores_objects_under_the_bucket_directory() -> anyhow::Result<()> {
        let remote = tempfile::tempdir()?;
        let local = tempfile::tempdir()?;
        let bucket = remote.path().to_string_lossy().into_owned();
        let store = StorageBackend::new(StorageConfig::new(BackendType::Fs, bucket))?;

        let source = local.path().join("tokenizer.json");
        tokio::fs::write(&source, b"{}").await?;
        store.put(&source, "tokenizer.json").await?;

        assert!(remote.path().join("tokenizer.json").exists());
        assert_eq!(store.backend_type(), BackendType::Fs);
        assert_eq!(store.location(), remote.path().to_string_lossy());

        Ok(())
    }

    #[test]
    fn missing_bucket_fails_fast() {
        let err = StorageBackend::new(StorageConfig::default()).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }
}
