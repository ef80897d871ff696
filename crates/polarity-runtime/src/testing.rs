//! Test doubles shared by the unit tests.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use polarity_core::{BlobStore, Result};
use polarity_opendal::{StorageBackend, StorageConfig};

/// Creates an empty in-memory store.
pub fn memory_store() -> anyhow::Result<StorageBackend> {
    Ok(StorageBackend::new(StorageConfig::memory("artifacts"))?)
}

/// Wraps a store and counts every call made through [`BlobStore`].
#[derive(Debug)]
pub struct CountingStore {
    inner: StorageBackend,
    get_delay: Duration,
    failing_gets: AtomicBool,
    exists: AtomicUsize,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: StorageBackend) -> Arc<Self> {
        Self::with_get_delay(inner, Duration::ZERO)
    }

    /// Slows every `get` down so concurrent callers overlap.
    pub fn with_get_delay(inner: StorageBackend, get_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            get_delay,
            failing_gets: AtomicBool::new(false),
            exists: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        })
    }

    /// Writes an object without counting it.
    pub async fn seed(&self, key: &str, data: &[u8]) -> anyhow::Result<()> {
        self.inner.write(key, data.to_vec()).await?;
        Ok(())
    }

    /// Reads an object without counting it.
    pub async fn object(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.inner.read(key).await?)
    }

    /// Makes every following `get` fail after its delay, without touching disk.
    pub fn fail_gets(&self, fail: bool) {
        self.failing_gets.store(fail, Ordering::SeqCst);
    }

    pub fn exists_calls(&self) -> usize {
        self.exists.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.exists_calls() + self.gets() + self.puts()
    }
}

#[async_trait]
impl BlobStore for CountingStore {
    fn location(&self) -> &str {
        self.inner.location()
    }

    async fn location_exists(&self) -> Result<bool> {
        self.inner.location_exists().await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<()> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if !self.get_delay.is_zero() {
            tokio::time::sleep(self.get_delay).await;
        }
        if self.failing_gets.load(Ordering::SeqCst) {
            return Err(polarity_core::Error::storage()
                .with_message(format!("{key}: connection reset")));
        }
        self.inner.get(key, local_path).await
    }

    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(local_path, key).await
    }
}

/// Store whose location never exists.
#[derive(Debug, Default)]
pub struct MissingLocation {
    calls: AtomicUsize,
}

impl MissingLocation {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MissingLocation {
    fn location(&self) -> &str {
        "missing-bucket"
    }

    async fn location_exists(&self) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn get(&self, _key: &str, _local_path: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(polarity_core::Error::remote_not_found())
    }

    async fn put(&self, _local_path: &Path, _key: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
