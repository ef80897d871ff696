use std::fmt;
use std::sync::Arc;

use derive_more::{Deref, From};
use polarity_core::Result;
use polarity_runtime::Predictor;

use crate::service::TRACING_TARGET;

/// Text scored by the warm-up prediction.
const WARM_UP_TEXT: &str = "warm up!";

/// Shared handle to the predictor behind `POST /predict`.
#[derive(Clone, Deref, From)]
pub struct PredictionService(Arc<dyn Predictor>);

impl PredictionService {
    /// Wraps a predictor.
    pub fn new(predictor: impl Predictor + 'static) -> Self {
        Self(Arc::new(predictor))
    }

    /// Runs one prediction so both artifacts are resident before traffic
    /// arrives.
    pub async fn warm_up(&self) -> Result<f32> {
        tracing::info!(target: TRACING_TARGET, "Warming up model");
        let score = self.0.predict(WARM_UP_TEXT).await?;
        tracing::info!(target: TRACING_TARGET, score = score, "Model is ready");
        Ok(score)
    }
}

impl fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PredictionService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl Predictor for Counting {
        async fn predict(&self, text: &str) -> Result<f32> {
            assert_eq!(text, WARM_UP_TEXT);
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(0.5)
        }
    }

    #[tokio::test]
    async fn warm_up_runs_one_prediction() -> anyhow::Result<()> {
        let predictor = Arc::new(Counting::default());
        let service = PredictionService::from(predictor.clone() as Arc<dyn Predictor>);

        assert_eq!(service.warm_up().await?, 0.5);
        assert_eq!(predictor.0.load(Ordering::SeqCst), 1);

        Ok(())
    }
}
