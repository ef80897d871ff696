#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod classifier;
mod corpus;
mod tokenizer;
mod training;

#[doc(hidden)]
pub mod prelude;

pub use classifier::LinearClassifier;
pub use corpus::{Corpus, NEGATIVE, POSITIVE};
pub use tokenizer::WordTokenizer;
pub use training::{DEFAULT_SEQUENCE_LENGTH, Trainer, TrainingConfig, evaluate};

/// Tracing target for training progress.
pub const TRACING_TARGET_TRAINING: &str = "polarity_model::training";
