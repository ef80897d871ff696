use serde::{Deserialize, Serialize};

/// Body of a successful `POST /predict`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Probability that the text is positive, in `[0, 1]`.
    pub score: f32,
}

impl PredictionResponse {
    /// Creates a new response.
    #[inline]
    pub fn new(score: f32) -> Self {
        Self { score }
    }

    /// Returns whether the score counts as positive sentiment.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.score > 0.5
    }
}
