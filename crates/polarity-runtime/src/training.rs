//! The `train` workflow.

use polarity_core::{Artifact, ArtifactKind, ArtifactLayout, Result, Tokenizer, write_atomic};
use polarity_model::{Trainer, evaluate};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_TRAINING;
use crate::corpus::CorpusLoader;
use crate::materialize::Origin;

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Number of sentences in the corpus.
    pub sentences: usize,
    /// Number of distinct words in the fitted vocabulary.
    pub vocabulary_size: usize,
    /// Accuracy of the trained pair over the whole corpus.
    pub accuracy: f32,
}

/// Loads the corpus, fits a tokenizer and classifier, and writes both into
/// the local artifact directory.
///
/// The tokenizer is written before the model. Each write is atomic, so a
/// failed run leaves earlier artifacts intact.
pub async fn train<O: Origin>(
    layout: &ArtifactLayout,
    loader: &CorpusLoader<O>,
    trainer: &Trainer,
) -> Result<TrainingReport> {
    let corpus = loader.load().await?;
    let (tokenizer, classifier) = trainer.fit(&corpus)?;
    let accuracy = evaluate(&tokenizer, &classifier, &corpus)?;

    layout.ensure_data_dir().await?;

    let tokenizer_path = layout.local_path(ArtifactKind::Tokenizer);
    write_atomic(&tokenizer_path, &tokenizer.to_bytes()?).await?;

    let model_path = layout.local_path(ArtifactKind::Model);
    write_atomic(&model_path, &classifier.to_bytes()?).await?;

    let report = TrainingReport {
        sentences: corpus.len(),
        vocabulary_size: tokenizer.vocabulary_size(),
        accuracy,
    };

    tracing::info!(
        target: TRACING_TARGET_TRAINING,
        sentences = report.sentences,
        vocabulary_size = report.vocabulary_size,
        accuracy = report.accuracy,
        tokenizer = %tokenizer_path.display(),
        model = %model_path.display(),
        "Training complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use polarity_model::{Corpus, LinearClassifier, TrainingConfig, WordTokenizer};

    use super::*;

    struct Sentences;

    #[async_trait]
    impl Origin for Sentences {
        fn describe(&self) -> String {
            "sentences".to_owned()
        }

        async fn fetch(&self, local_path: &Path) -> Result<()> {
            let corpus = Corpus::new(
                vec!["lovely warm story".to_owned(), "cold dreary mess".to_owned()],
                vec![1, 0],
            )?;
            write_atomic(local_path, &corpus.to_json()?).await
        }
    }

    #[tokio::test]
    async fn writes_both_artifacts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = ArtifactLayout::new(dir.path().join("data"));
        let loader = CorpusLoader::new(layout.corpus_path(), Sentences);
        let trainer = Trainer::new(
            TrainingConfig::default()
                .with_epochs(20)
                .with_learning_rate(0.5)
                .with_validation_split(0.0),
        );

        let report = train(&layout, &loader, &trainer).await?;
        assert_eq!(report.sentences, 2);
        assert_eq!(report.vocabulary_size, 6);
        assert_eq!(report.accuracy, 1.0);

        let tokenizer =
            WordTokenizer::from_bytes(&tokio::fs::read(layout.local_path(ArtifactKind::Tokenizer)).await?)?;
        let model =
            LinearClassifier::from_bytes(&tokio::fs::read(layout.local_path(ArtifactKind::Model)).await?)?;
        assert_eq!(tokenizer.vocabulary_size(), 6);
        assert_eq!(model.vocabulary_size(), 6);

        Ok(())
    }
}
