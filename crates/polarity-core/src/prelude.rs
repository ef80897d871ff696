//! Prelude module for convenient imports.

pub use crate::artifact::{Artifact, ArtifactKind, ArtifactRef};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::inference::{Model, Probabilities, Tokenizer};
pub use crate::layout::ArtifactLayout;
pub use crate::store::BlobStore;
