//! Read-through materialization of local files.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use polarity_core::{BlobStore, Error, Result, local_exists};

use crate::TRACING_TARGET_MATERIALIZE;

/// Where a missing local file is fetched from.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Human-readable name of the origin, for logs and errors.
    fn describe(&self) -> String;

    /// Fetches the content and writes it to `local_path`.
    ///
    /// Implementations must write atomically so a failed fetch never leaves a
    /// partial file behind.
    async fn fetch(&self, local_path: &Path) -> Result<()>;
}

/// Returns the bytes at `local_path`, fetching them from `origin` first if
/// the file does not exist yet.
///
/// An existing local file always wins, and the origin is never consulted.
pub async fn materialize<O>(local_path: &Path, origin: &O) -> Result<Vec<u8>>
where
    O: Origin + ?Sized,
{
    if !local_exists(local_path).await? {
        tracing::info!(
            target: TRACING_TARGET_MATERIALIZE,
            path = %local_path.display(),
            origin = %origin.describe(),
            "Local copy missing, fetching"
        );

        origin.fetch(local_path).await?;
    }

    Ok(tokio::fs::read(local_path).await?)
}

/// A single key in the remote blob store.
pub struct RemoteOrigin {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl RemoteOrigin {
    /// Creates an origin for `key` in `store`.
    pub fn new(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl Origin for RemoteOrigin {
    fn describe(&self) -> String {
        format!("{}/{}", self.store.location(), self.key)
    }

    async fn fetch(&self, local_path: &Path) -> Result<()> {
        if !self.store.exists(&self.key).await? {
            return Err(Error::remote_not_found()
                .with_message(format!("Could not find {}. Need to upload?", self.describe())));
        }

        self.store.get(&self.key, local_path).await
    }
}

impl std::fmt::Debug for RemoteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteOrigin")
            .field("location", &self.store.location())
            .field("key", &self.key)
            .finish()
    }
}
