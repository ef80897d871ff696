//! Local artifact configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use polarity_core::{
    ArtifactLayout, DEFAULT_CORPUS_FILE, DEFAULT_MODEL_FILE, DEFAULT_TOKENIZER_FILE,
};
use serde::{Deserialize, Serialize};

use crate::corpus::{CorpusLoader, DEFAULT_CORPUS_URL};

/// Where artifacts and the training corpus live locally, and where the corpus
/// is downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ArtifactConfig {
    /// Directory holding the local artifact copies and the corpus cache.
    #[cfg_attr(feature = "config", arg(long, env = "DATA_DIR", default_value = "./data"))]
    pub data_dir: PathBuf,

    /// File name of the model, locally and in the remote store.
    #[cfg_attr(feature = "config", arg(long, env = "MODEL_FILE", default_value = DEFAULT_MODEL_FILE))]
    pub model_file: String,

    /// File name of the tokenizer, locally and in the remote store.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TOKENIZER_FILE", default_value = DEFAULT_TOKENIZER_FILE)
    )]
    pub tokenizer_file: String,

    /// File name of the persisted training corpus.
    #[cfg_attr(feature = "config", arg(long, env = "CORPUS_FILE", default_value = DEFAULT_CORPUS_FILE))]
    pub corpus_file: String,

    /// URL of the training corpus archive.
    #[cfg_attr(feature = "config", arg(long, env = "CORPUS_URL", default_value = DEFAULT_CORPUS_URL))]
    pub corpus_url: String,
}

impl ArtifactConfig {
    /// Creates a configuration rooted at `data_dir` with default file names.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_file: DEFAULT_MODEL_FILE.to_owned(),
            tokenizer_file: DEFAULT_TOKENIZER_FILE.to_owned(),
            corpus_file: DEFAULT_CORPUS_FILE.to_owned(),
            corpus_url: DEFAULT_CORPUS_URL.to_owned(),
        }
    }

    /// Sets the corpus archive URL.
    pub fn with_corpus_url(mut self, corpus_url: impl Into<String>) -> Self {
        self.corpus_url = corpus_url.into();
        self
    }

    /// Returns the artifact layout described by this configuration.
    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.data_dir)
            .with_model_file(&self.model_file)
            .with_tokenizer_file(&self.tokenizer_file)
            .with_corpus_file(&self.corpus_file)
    }

    /// Returns a loader for the training corpus.
    pub fn corpus_loader(&self) -> CorpusLoader {
        CorpusLoader::http(self.layout().corpus_path(), &self.corpus_url)
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new("./data")
    }
}

#[cfg(test)]
mod tests {
    use polarity_core::ArtifactKind;

    use super::*;

    #[test]
    fn layout_uses_configured_names() {
        let config = ArtifactConfig {
            model_file: "classifier.json".to_owned(),
            ..ArtifactConfig::new("/srv/polarity")
        };
        let layout = config.layout();

        assert_eq!(
            layout.local_path(ArtifactKind::Model),
            PathBuf::from("/srv/polarity/classifier.json")
        );
        assert_eq!(layout.remote_key(ArtifactKind::Tokenizer), "tokenizer.json");
        assert_eq!(config.corpus_loader().path(), PathBuf::from("/srv/polarity/rt-polarity.json"));
    }
}
