//! Local artifact directory.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{ArtifactKind, ArtifactRef, Error, Result, TRACING_TARGET_LAYOUT};

/// Default file name of the serialized model.
pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// Default file name of the serialized tokenizer.
pub const DEFAULT_TOKENIZER_FILE: &str = "tokenizer.json";

/// Default file name of the persisted training corpus.
pub const DEFAULT_CORPUS_FILE: &str = "rt-polarity.json";

/// Where artifacts live on local disk and under which keys they are mirrored remotely.
///
/// The remote layout mirrors the local one: an artifact stored at
/// `<data-dir>/model.json` is promoted to `<location>/model.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    data_dir: PathBuf,
    model_file: String,
    tokenizer_file: String,
    corpus_file: String,
}

impl ArtifactLayout {
    /// Creates a layout rooted at `data_dir` with the default file names.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_file: DEFAULT_MODEL_FILE.to_owned(),
            tokenizer_file: DEFAULT_TOKENIZER_FILE.to_owned(),
            corpus_file: DEFAULT_CORPUS_FILE.to_owned(),
        }
    }

    /// Overrides the model file name.
    pub fn with_model_file(mut self, file: impl Into<String>) -> Self {
        self.model_file = file.into();
        self
    }

    /// Overrides the tokenizer file name.
    pub fn with_tokenizer_file(mut self, file: impl Into<String>) -> Self {
        self.tokenizer_file = file.into();
        self
    }

    /// Overrides the corpus file name.
    pub fn with_corpus_file(mut self, file: impl Into<String>) -> Self {
        self.corpus_file = file.into();
        self
    }

    /// Returns the local data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the file name an artifact is stored under, both locally and remotely.
    pub fn file_name(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Model => &self.model_file,
            ArtifactKind::Tokenizer => &self.tokenizer_file,
        }
    }

    /// Returns the local path of an artifact.
    pub fn local_path(&self, kind: ArtifactKind) -> PathBuf {
        self.data_dir.join(self.file_name(kind))
    }

    /// Returns the remote key of an artifact.
    pub fn remote_key(&self, kind: ArtifactKind) -> String {
        self.file_name(kind).to_owned()
    }

    /// Returns the full reference of an artifact.
    pub fn artifact_ref(&self, kind: ArtifactKind) -> ArtifactRef {
        ArtifactRef::new(kind, self.local_path(kind), self.remote_key(kind))
    }

    /// Returns the local path of the persisted training corpus.
    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir.join(&self.corpus_file)
    }

    /// Creates the data directory if it does not exist yet.
    pub async fn ensure_data_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }
}

/// Returns whether a local file exists.
pub async fn local_exists(path: &Path) -> Result<bool> {
    Ok(tokio::fs::try_exists(path).await?)
}

/// Writes `bytes` to `path` so that readers only ever see the old or the complete new file.
///
/// The data is written to a uniquely named sibling first and renamed into
/// place; the temporary file is removed if the rename fails.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        Error::invalid_input().with_message(format!("{} has no file name", path.display()))
    })?;

    tokio::fs::create_dir_all(parent).await?;

    let temp_path = parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::now_v7().simple()
    ));

    tracing::trace!(
        target: TRACING_TARGET_LAYOUT,
        path = %path.display(),
        temp_path = %temp_path.display(),
        size = bytes.len(),
        "Writing file through temporary path"
    );

    tokio::fs::write(&temp_path, bytes).await?;

    if let Err(err) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(err.into());
    }

    tracing::debug!(
        target: TRACING_TARGET_LAYOUT,
        path = %path.display(),
        size = bytes.len(),
        "File written"
    );

    Ok(())
}
