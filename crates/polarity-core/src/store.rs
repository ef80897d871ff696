//! Remote object store contract.

use std::path::Path;

use async_trait::async_trait;

use crate::Result;

/// An opaque key/value object store holding the remote copies of artifacts.
///
/// Keys are relative to a single configured location (a bucket, container or
/// directory). Callers should confirm [`location_exists`] before treating a
/// key-level failure as a data problem rather than a misconfiguration.
///
/// [`location_exists`]: BlobStore::location_exists
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the configured location, for diagnostics.
    fn location(&self) -> &str;

    /// Returns whether the configured location itself exists and is reachable.
    async fn location_exists(&self) -> Result<bool>;

    /// Returns whether an object exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Copies the object under `key` to `local_path`, replacing any existing file.
    ///
    /// Fails with [`ErrorKind::RemoteNotFound`] if the key is absent.
    ///
    /// [`ErrorKind::RemoteNotFound`]: crate::ErrorKind::RemoteNotFound
    async fn get(&self, key: &str, local_path: &Path) -> Result<()>;

    /// Copies the file at `local_path` to `key`, replacing any existing object.
    ///
    /// Fails with [`ErrorKind::LocalNotFound`] if the local file is absent.
    ///
    /// [`ErrorKind::LocalNotFound`]: crate::ErrorKind::LocalNotFound
    async fn put(&self, local_path: &Path, key: &str) -> Result<()>;
}
