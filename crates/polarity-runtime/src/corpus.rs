//! Training corpus download and local cache.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use polarity_core::{Error, Result, write_atomic};
use polarity_model::Corpus;
use reqwest::Client;

use crate::TRACING_TARGET_CORPUS;
use crate::materialize::{Origin, materialize};

/// Public archive of the sentence polarity dataset.
pub const DEFAULT_CORPUS_URL: &str =
    "http://www.cs.cornell.edu/people/pabo/movie-review-data/rt-polaritydata.tar.gz";

/// A gzip tarball served over HTTP, persisted locally as corpus JSON.
#[derive(Debug, Clone)]
pub struct HttpArchiveOrigin {
    client: Client,
    url: String,
}

impl HttpArchiveOrigin {
    /// Creates an origin downloading from `url`.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn download(&self) -> reqwest::Result<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Origin for HttpArchiveOrigin {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self, local_path: &Path) -> Result<()> {
        tracing::info!(target: TRACING_TARGET_CORPUS, url = %self.url, "Downloading corpus archive");

        let archive = self.download().await.map_err(|err| {
            Error::network()
                .with_message(format!("failed to download {}", self.url))
                .with_source(err)
        })?;

        let corpus = Corpus::from_archive(&archive)?;
        tracing::info!(
            target: TRACING_TARGET_CORPUS,
            sentences = corpus.len(),
            path = %local_path.display(),
            "Corpus archive parsed"
        );

        write_atomic(local_path, &corpus.to_json()?).await
    }
}

/// Reads the corpus from disk, downloading it on first use.
#[derive(Debug)]
pub struct CorpusLoader<O = HttpArchiveOrigin> {
    path: PathBuf,
    origin: O,
}

impl CorpusLoader {
    /// Creates a loader for the archive at `url`, cached at `path`.
    pub fn http(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self::new(path, HttpArchiveOrigin::new(Client::new(), url))
    }
}

impl<O: Origin> CorpusLoader<O> {
    /// Creates a loader that fetches from `origin` when `path` is missing.
    pub fn new(path: impl Into<PathBuf>, origin: O) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }

    /// Returns the local corpus path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the corpus.
    pub async fn load(&self) -> Result<Corpus> {
        let bytes = materialize(&self.path, &self.origin).await?;
        Corpus::from_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Fixed {
        corpus: Corpus,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl Origin for Fixed {
        fn describe(&self) -> String {
            "fixed".to_owned()
        }

        async fn fetch(&self, local_path: &Path) -> Result<()> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            write_atomic(local_path, &self.corpus.to_json()?).await
        }
    }

    #[tokio::test]
    async fn fetches_once_then_reads_locally() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let corpus = Corpus::new(vec!["nice".to_owned()], vec![1])?;
        let loader = CorpusLoader::new(
            dir.path().join("rt-polarity.json"),
            Fixed {
                corpus: corpus.clone(),
                fetches: AtomicUsize::new(0),
            },
        );

        assert_eq!(loader.load().await?, corpus);
        assert_eq!(loader.load().await?, corpus);
        assert_eq!(loader.origin.fetches.load(Ordering::SeqCst), 1);
        assert!(loader.path().exists());

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_archive_is_a_network_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let loader = CorpusLoader::http(dir.path().join("corpus.json"), "http://127.0.0.1:9/data.tar.gz");

        let err = loader.load().await.unwrap_err();
        assert_eq!(err.kind(), polarity_core::ErrorKind::Network);
        assert!(!loader.path().exists());

        Ok(())
    }
}
