//! Prelude module for convenient imports.

pub use crate::classifier::LinearClassifier;
pub use crate::corpus::Corpus;
pub use crate::tokenizer::WordTokenizer;
pub use crate::training::{Trainer, TrainingConfig, evaluate};
