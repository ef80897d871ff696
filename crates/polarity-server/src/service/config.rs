//! Where the prediction service finds its artifacts.

#[cfg(feature = "config")]
use clap::Args;
use polarity_opendal::StorageConfig;
use polarity_runtime::ArtifactConfig;
use serde::{Deserialize, Serialize};

/// Remote and local artifact locations the [`ServiceState`] is built from.
///
/// [`ServiceState`]: crate::service::ServiceState
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Remote blob store holding the promoted artifacts.
    #[cfg_attr(feature = "config", command(flatten))]
    pub storage: StorageConfig,

    /// Local artifact directory and file names.
    #[cfg_attr(feature = "config", command(flatten))]
    pub artifacts: ArtifactConfig,
}

impl ServiceConfig {
    pub fn new(storage: StorageConfig, artifacts: ArtifactConfig) -> Self {
        Self { storage, artifacts }
    }
}
