#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod cache;
mod config;
mod corpus;
mod materialize;
mod pipeline;
mod sync;
mod training;

#[cfg(test)]
mod testing;

#[doc(hidden)]
pub mod prelude;

pub use cache::ArtifactCache;
pub use config::ArtifactConfig;
pub use corpus::{CorpusLoader, DEFAULT_CORPUS_URL, HttpArchiveOrigin};
pub use materialize::{Origin, RemoteOrigin, materialize};
pub use pipeline::{InferencePipeline, Predictor, SentimentPipeline};
pub use sync::ArtifactSync;
pub use training::{TrainingReport, train};

/// Tracing target for artifact cache resolution.
pub const TRACING_TARGET_CACHE: &str = "polarity_runtime::cache";

/// Tracing target for local file materialization.
pub const TRACING_TARGET_MATERIALIZE: &str = "polarity_runtime::materialize";

/// Tracing target for download and upload operations.
pub const TRACING_TARGET_SYNC: &str = "polarity_runtime::sync";

/// Tracing target for predictions.
pub const TRACING_TARGET_PIPELINE: &str = "polarity_runtime::pipeline";

/// Tracing target for corpus ingestion.
pub const TRACING_TARGET_CORPUS: &str = "polarity_runtime::corpus";

/// Tracing target for the training workflow.
pub const TRACING_TARGET_TRAINING: &str = "polarity_runtime::training";
