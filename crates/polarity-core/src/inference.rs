//! Capabilities the inference pipeline depends on.
//!
//! The pipeline only ever sees these traits, so the numeric backend behind a
//! model or tokenizer can be swapped without touching the caching layer.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Converts text into an integer sequence using a fitted vocabulary.
pub trait Tokenizer: Send + Sync {
    /// Encodes text into vocabulary indices.
    ///
    /// Words outside the vocabulary are dropped; index `0` is never produced
    /// because it is reserved for padding.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Returns the number of distinct words in the vocabulary.
    fn vocabulary_size(&self) -> usize;
}

/// A trained two-class classifier.
pub trait Model: Send + Sync {
    /// Fixed input width the model was trained against.
    fn expected_sequence_length(&self) -> usize;

    /// Runs a forward pass over one padded sequence.
    fn infer(&self, sequence: &[u32]) -> Result<Probabilities>;
}

/// Probability distribution over {negative, positive}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    /// Probability of negative sentiment.
    pub negative: f32,
    /// Probability of positive sentiment.
    pub positive: f32,
}

impl Probabilities {
    /// Builds a distribution from raw class logits with a numerically stable softmax.
    pub fn from_logits(logits: [f32; 2]) -> Self {
        let max = logits[0].max(logits[1]);
        let negative = (logits[0] - max).exp();
        let positive = (logits[1] - max).exp();
        let total = negative + positive;

        Self {
            negative: (negative / total).clamp(0.0, 1.0),
            positive: (positive / total).clamp(0.0, 1.0),
        }
    }

    /// Returns the index of the most likely class (0 = negative, 1 = positive).
    pub fn label(&self) -> u8 {
        u8::from(self.positive > self.negative)
    }
}

/// Pads or truncates a sequence to exactly `length` entries.
///
/// Padding (`0`) is prepended and truncation drops leading tokens, so the most
/// recent words always survive.
pub fn pad_sequence(sequence: &[u32], length: usize) -> Vec<u32> {
    if sequence.len() >= length {
        return sequence[sequence.len() - length..].to_vec();
    }

    let mut padded = vec![0; length - sequence.len()];
    padded.extend_from_slice(sequence);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_at_the_front() {
        assert_eq!(pad_sequence(&[4, 5], 4), vec![0, 0, 4, 5]);
        assert_eq!(pad_sequence(&[], 3), vec![0, 0, 0]);
    }

    #[test]
    fn truncates_leading_tokens() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3), vec![3, 4, 5]);
        assert_eq!(pad_sequence(&[1, 2, 3], 3), vec![1, 2, 3]);
    }

    #[test]
    fn softmax_is_a_distribution() {
        let probs = Probabilities::from_logits([1000.0, -1000.0]);
        assert!((probs.negative + probs.positive - 1.0).abs() < 1e-6);
        assert_eq!(probs.label(), 0);

        let even = Probabilities::from_logits([0.3, 0.3]);
        assert!((even.positive - 0.5).abs() < 1e-6);
    }
}
