//! Text to sentiment score.

use std::sync::Arc;

use async_trait::async_trait;
use polarity_core::{
    Artifact, ArtifactLayout, BlobStore, Model, Probabilities, Result, Tokenizer, pad_sequence,
};
use polarity_model::{LinearClassifier, WordTokenizer};

use crate::TRACING_TARGET_PIPELINE;
use crate::cache::ArtifactCache;

/// Anything that scores text.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Returns the probability that `text` is positive, in `[0, 1]`.
    async fn predict(&self, text: &str) -> Result<f32>;
}

/// Tokenizer and model resolved through their caches and run in sequence.
pub struct InferencePipeline<T, M> {
    tokenizer: ArtifactCache<T>,
    model: ArtifactCache<M>,
}

/// The pipeline over the concrete artifacts this workspace trains.
pub type SentimentPipeline = InferencePipeline<WordTokenizer, LinearClassifier>;

impl<T, M> InferencePipeline<T, M>
where
    T: Tokenizer + Artifact,
    M: Model + Artifact,
{
    /// Creates a pipeline over two caches.
    pub fn new(tokenizer: ArtifactCache<T>, model: ArtifactCache<M>) -> Self {
        Self { tokenizer, model }
    }

    /// Creates a pipeline with fresh caches over `store` and `layout`.
    pub fn from_store(store: Arc<dyn BlobStore>, layout: &ArtifactLayout) -> Self {
        Self::new(
            ArtifactCache::new(Arc::clone(&store), layout),
            ArtifactCache::new(store, layout),
        )
    }

    /// Returns the full class distribution for `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ArtifactUnavailable`] naming whichever artifact
    /// could not be resolved.
    ///
    /// [`ErrorKind::ArtifactUnavailable`]: polarity_core::ErrorKind::ArtifactUnavailable
    pub async fn probabilities(&self, text: &str) -> Result<Probabilities> {
        let tokenizer = self.tokenizer.get().await?;
        let model = self.model.get().await?;

        let length = model.expected_sequence_length();
        let sequence = pad_sequence(&tokenizer.encode(text), length);
        let probabilities = model.infer(&sequence)?;

        tracing::debug!(
            target: TRACING_TARGET_PIPELINE,
            chars = text.len(),
            sequence_length = length,
            positive = probabilities.positive,
            "Prediction complete"
        );

        Ok(probabilities)
    }
}

#[async_trait]
impl<T, M> Predictor for InferencePipeline<T, M>
where
    T: Tokenizer + Artifact,
    M: Model + Artifact,
{
    async fn predict(&self, text: &str) -> Result<f32> {
        Ok(self.probabilities(text).await?.positive)
    }
}

impl<T, M> std::fmt::Debug for InferencePipeline<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("tokenizer", &self.tokenizer)
            .field("model", &self.model)
            .finish()
    }
}
