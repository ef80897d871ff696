//! Application state and dependency injection.

mod config;
mod predictions;

use std::sync::Arc;

use polarity_core::{BlobStore, Result};
use polarity_opendal::StorageBackend;
use polarity_runtime::SentimentPipeline;

pub use crate::service::config::ServiceConfig;
pub use crate::service::predictions::PredictionService;

/// Tracing target for service initialization.
pub const TRACING_TARGET: &str = "polarity_server::service";

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub predictions: PredictionService,
}

impl ServiceState {
    /// Creates the state around an existing prediction service.
    pub fn new(predictions: PredictionService) -> Self {
        Self { predictions }
    }

    /// Initializes application state from configuration.
    ///
    /// Fails when the remote location is not configured. Artifacts are not
    /// touched until the first prediction, or [`PredictionService::warm_up`].
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = StorageBackend::new(config.storage.clone())?;
        let layout = config.artifacts.layout();

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.storage.backend_name(),
            location = %store.location(),
            data_dir = %layout.data_dir().display(),
            "Service state initialized"
        );

        let pipeline = SentimentPipeline::from_store(Arc::new(store), &layout);
        Ok(Self::new(PredictionService::new(pipeline)))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(predictions: PredictionService);

#[cfg(test)]
mod tests {
    use polarity_core::ErrorKind;
    use polarity_opendal::StorageConfig;
    use polarity_runtime::ArtifactConfig;

    use super::*;

    #[test]
    fn unset_bucket_fails_fast() {
        let config = ServiceConfig::new(StorageConfig::default(), ArtifactConfig::default());

        let error = ServiceState::from_config(&config).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
