//! Artifact identity and codec.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::Result;

/// The two logical artifacts the service needs before it can predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    /// The trained classifier.
    Model,
    /// The fitted vocabulary used to turn text into integer sequences.
    Tokenizer,
}

/// Identifies one logical artifact across both storage tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Which artifact this is.
    pub kind: ArtifactKind,
    /// Where the local copy lives.
    pub local_path: PathBuf,
    /// Key of the remote copy, relative to the configured location.
    pub remote_key: String,
}

impl ArtifactRef {
    /// Creates a new artifact reference.
    pub fn new(kind: ArtifactKind, local_path: impl Into<PathBuf>, remote_key: impl Into<String>) -> Self {
        Self {
            kind,
            local_path: local_path.into(),
            remote_key: remote_key.into(),
        }
    }
}

/// An artifact that can be rebuilt from, and written back to, its serialized blob.
///
/// Implementors bind their [`ArtifactKind`] statically so a cache or sync
/// operation can never pair a blob with the wrong decoder.
pub trait Artifact: Sized + Send + Sync + 'static {
    /// The artifact kind this type is stored as.
    const KIND: ArtifactKind;

    /// Decodes the artifact from its serialized form.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Encodes the artifact into its serialized form.
    fn to_bytes(&self) -> Result<Vec<u8>>;
}
