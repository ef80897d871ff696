//! Lazily resolved, memoized artifacts.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use polarity_core::{Artifact, ArtifactLayout, ArtifactRef, BlobStore, Error, Result};
use tokio::sync::{Mutex, OnceCell};

use crate::TRACING_TARGET_CACHE;
use crate::materialize::{RemoteOrigin, materialize};

/// Outcome of one resolution, cloned out to every waiter.
type Resolution<A> = std::result::Result<Arc<A>, Arc<Error>>;

/// A resolution in progress.
type InFlight<A> = Shared<BoxFuture<'static, Resolution<A>>>;

/// Process-local cache slot for one artifact kind.
///
/// The first [`get`] resolves the artifact: the local copy is decoded if it
/// exists, otherwise the remote copy is hydrated into the local directory
/// first. Concurrent callers that arrive while a resolution is running await
/// that same resolution and observe its outcome. Once it succeeds the artifact
/// is served from a lock-free cell for the lifetime of the cache. A failed
/// resolution leaves the slot empty, so the next call retries from scratch.
/// A panic while decoding counts as a failed resolution.
///
/// [`get`]: ArtifactCache::get
pub struct ArtifactCache<A> {
    store: Arc<dyn BlobStore>,
    artifact: ArtifactRef,
    ready: OnceCell<Arc<A>>,
    inflight: Mutex<Option<InFlight<A>>>,
}

impl<A: Artifact> ArtifactCache<A> {
    /// Creates an empty cache for `A::KIND`, laid out by `layout`.
    pub fn new(store: Arc<dyn BlobStore>, layout: &ArtifactLayout) -> Self {
        Self::with_ref(store, layout.artifact_ref(A::KIND))
    }

    /// Creates an empty cache for an explicit artifact reference.
    pub fn with_ref(store: Arc<dyn BlobStore>, artifact: ArtifactRef) -> Self {
        Self {
            store,
            artifact,
            ready: OnceCell::new(),
            inflight: Mutex::new(None),
        }
    }

    /// Returns the artifact reference this cache resolves.
    pub fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// Returns whether the artifact has been resolved.
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Returns the shared artifact instance, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ArtifactUnavailable`] naming `A::KIND` when the
    /// artifact exists in neither tier or cannot be decoded. The underlying
    /// failure is attached as the error source.
    ///
    /// [`ErrorKind::ArtifactUnavailable`]: polarity_core::ErrorKind::ArtifactUnavailable
    pub async fn get(&self) -> Result<Arc<A>> {
        if let Some(artifact) = self.ready.get() {
            return Ok(Arc::clone(artifact));
        }

        let resolution = {
            let mut inflight = self.inflight.lock().await;

            // A resolution may have completed while we waited for the lock.
            if let Some(artifact) = self.ready.get() {
                return Ok(Arc::clone(artifact));
            }

            match inflight.as_ref() {
                Some(resolution) => {
                    tracing::debug!(
                        target: TRACING_TARGET_CACHE,
                        kind = %A::KIND,
                        "Joining in-flight resolution"
                    );
                    resolution.clone()
                }
                None => {
                    let resolve = Self::resolve(Arc::clone(&self.store), self.artifact.clone());
                    let resolution = AssertUnwindSafe(resolve)
                        .catch_unwind()
                        .map(|caught| {
                            caught.unwrap_or_else(|payload| Err(Arc::new(panicked::<A>(payload))))
                        })
                        .boxed()
                        .shared();
                    *inflight = Some(resolution.clone());
                    resolution
                }
            }
        };

        let outcome = resolution.clone().await;

        {
            let mut inflight = self.inflight.lock().await;
            if let Ok(artifact) = &outcome {
                // Fails only if another waiter already stored this same instance.
                let _ = self.ready.set(Arc::clone(artifact));
            }
            if inflight.as_ref().is_some_and(|current| current.ptr_eq(&resolution)) {
                *inflight = None;
            }
        }

        outcome.map_err(|source| {
            Error::artifact_unavailable(A::KIND)
                .with_message(format!("{} could not be loaded: {source}", A::KIND))
                .with_source(source)
        })
    }

    async fn resolve(store: Arc<dyn BlobStore>, artifact: ArtifactRef) -> Resolution<A> {
        tracing::info!(
            target: TRACING_TARGET_CACHE,
            kind = %artifact.kind,
            path = %artifact.local_path.display(),
            "Resolving artifact"
        );

        let origin = RemoteOrigin::new(store, artifact.remote_key.clone());
        let resolved = match materialize(&artifact.local_path, &origin).await {
            Ok(bytes) => A::from_bytes(&bytes),
            Err(err) => Err(err),
        };

        match resolved {
            Ok(value) => {
                tracing::info!(
                    target: TRACING_TARGET_CACHE,
                    kind = %artifact.kind,
                    "Artifact ready"
                );
                Ok(Arc::new(value))
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_CACHE,
                    kind = %artifact.kind,
                    error = %err,
                    "Artifact resolution failed"
                );
                Err(Arc::new(err))
            }
        }
    }
}

/// Converts a panic raised during resolution into a decode failure.
fn panicked<A: Artifact>(payload: Box<dyn Any + Send>) -> Error {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(
        target: TRACING_TARGET_CACHE,
        kind = %A::KIND,
        panic = %message,
        "Artifact resolution panicked"
    );

    Error::serialization()
        .with_artifact(A::KIND)
        .with_message(format!("resolving {} panicked: {message}", A::KIND))
}

impl<A> std::fmt::Debug for ArtifactCache<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("artifact", &self.artifact)
            .field("location", &self.store.location())
            .field("ready", &self.ready.initialized())
            .finish_non_exhaustive()
    }
}
