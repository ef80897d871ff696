//! Prelude module for convenient imports.

pub use crate::cache::ArtifactCache;
pub use crate::config::ArtifactConfig;
pub use crate::corpus::CorpusLoader;
pub use crate::pipeline::{InferencePipeline, Predictor, SentimentPipeline};
pub use crate::sync::ArtifactSync;
pub use crate::training::train;
