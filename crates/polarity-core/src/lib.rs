#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for local artifact directory operations.
pub const TRACING_TARGET_LAYOUT: &str = "polarity_core::layout";

mod artifact;
mod error;
mod inference;
mod layout;
mod store;

#[doc(hidden)]
pub mod prelude;

pub use artifact::{Artifact, ArtifactKind, ArtifactRef};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use inference::{Model, Probabilities, Tokenizer, pad_sequence};
pub use layout::{
    ArtifactLayout, DEFAULT_CORPUS_FILE, DEFAULT_MODEL_FILE, DEFAULT_TOKENIZER_FILE, local_exists,
    write_atomic,
};
pub use store::BlobStore;
