//! Explicit transfers between the local directory and the remote store.

use std::sync::Arc;

use polarity_core::{ArtifactKind, ArtifactLayout, BlobStore, Error, Result, local_exists};

use crate::TRACING_TARGET_SYNC;

/// Operator-invoked hydration and promotion of artifacts.
///
/// These never go through an [`ArtifactCache`] and never short-circuit:
/// `download` always re-fetches and `upload` always overwrites.
///
/// [`ArtifactCache`]: crate::ArtifactCache
#[derive(Clone)]
pub struct ArtifactSync {
    store: Arc<dyn BlobStore>,
    layout: ArtifactLayout,
}

impl ArtifactSync {
    /// Creates sync operations over `store` and `layout`.
    pub fn new(store: Arc<dyn BlobStore>, layout: ArtifactLayout) -> Self {
        Self { store, layout }
    }

    /// Returns the local artifact layout.
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Copies the remote artifact over the local one.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Configuration`] if the remote location does not exist.
    /// - [`ErrorKind::ArtifactMissing`] if the remote key does not exist.
    ///
    /// Neither failure touches the local directory.
    ///
    /// [`ErrorKind::Configuration`]: polarity_core::ErrorKind::Configuration
    /// [`ErrorKind::ArtifactMissing`]: polarity_core::ErrorKind::ArtifactMissing
    pub async fn download(&self, kind: ArtifactKind) -> Result<()> {
        self.require_location().await?;

        let key = self.layout.remote_key(kind);
        if !self.store.exists(&key).await? {
            return Err(Error::artifact_missing(kind).with_message(format!(
                "Could not find {}/{key}. Need to upload?",
                self.store.location()
            )));
        }

        let path = self.layout.local_path(kind);
        tracing::info!(
            target: TRACING_TARGET_SYNC,
            kind = %kind,
            key = %key,
            path = %path.display(),
            "Downloading artifact"
        );

        self.store.get(&key, &path).await?;

        tracing::info!(target: TRACING_TARGET_SYNC, kind = %kind, "Download complete");
        Ok(())
    }

    /// Copies the local artifact over the remote one.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::LocalArtifactMissing`] if there is no local copy.
    /// - [`ErrorKind::Configuration`] if the remote location does not exist.
    ///
    /// Neither failure touches the remote store.
    ///
    /// [`ErrorKind::LocalArtifactMissing`]: polarity_core::ErrorKind::LocalArtifactMissing
    /// [`ErrorKind::Configuration`]: polarity_core::ErrorKind::Configuration
    pub async fn upload(&self, kind: ArtifactKind) -> Result<()> {
        let path = self.layout.local_path(kind);
        if !local_exists(&path).await? {
            return Err(Error::local_artifact_missing(kind)
                .with_message(format!("Could not find {}. Need to train?", path.display())));
        }

        self.require_location().await?;

        let key = self.layout.remote_key(kind);
        tracing::info!(
            target: TRACING_TARGET_SYNC,
            kind = %kind,
            key = %key,
            path = %path.display(),
            "Uploading artifact"
        );

        self.store.put(&path, &key).await?;

        tracing::info!(target: TRACING_TARGET_SYNC, kind = %kind, "Upload complete");
        Ok(())
    }

    async fn require_location(&self) -> Result<()> {
        if self.store.location_exists().await? {
            return Ok(());
        }

        Err(Error::configuration().with_message(format!(
            "storage location {} does not exist",
            self.store.location()
        )))
    }
}

impl std::fmt::Debug for ArtifactSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSync")
            .field("location", &self.store.location())
            .field("layout", &self.layout)
            .finish()
    }
}
