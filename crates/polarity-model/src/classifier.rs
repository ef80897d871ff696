//! Linear two-class classifier over token sequences.

use polarity_core::{Artifact, ArtifactKind, Error, Model, Probabilities, Result};
use serde::{Deserialize, Serialize};

/// A softmax classifier over the mean of per-token class weights.
///
/// The classifier carries the sequence length it was trained with, so callers
/// pad inputs to [`Model::expected_sequence_length`] instead of a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    sequence_length: usize,
    vocabulary_size: usize,
    bias: [f32; 2],
    weights: [Vec<f32>; 2],
}

impl LinearClassifier {
    /// Creates a zero-initialized classifier.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if `sequence_length` is zero or the
    /// vocabulary leaves no room for the padding row.
    pub fn new(sequence_length: usize, vocabulary_size: usize) -> Result<Self> {
        let invalid = |message: &str| {
            Err(Error::invalid_input()
                .with_artifact(ArtifactKind::Model)
                .with_message(message))
        };

        if sequence_length == 0 {
            return invalid("sequence length must be at least 1");
        }
        let Some(rows) = row_len(vocabulary_size) else {
            return invalid("vocabulary size is too large");
        };

        Ok(Self {
            sequence_length,
            vocabulary_size,
            bias: [0.0; 2],
            weights: [vec![0.0; rows], vec![0.0; rows]],
        })
    }

    /// Returns the number of words the classifier has weights for.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Runs one SGD step on softmax cross-entropy and returns the loss.
    pub(crate) fn step(&mut self, sequence: &[u32], label: u8, learning_rate: f32) -> f32 {
        let tokens = self.tokens(sequence);
        let probabilities = Probabilities::from_logits(self.logits(&tokens));
        let predicted = [probabilities.negative, probabilities.positive];
        let target = usize::from(label.min(1));

        let scale = if tokens.is_empty() {
            0.0
        } else {
            1.0 / tokens.len() as f32
        };

        for (class, probability) in predicted.iter().enumerate() {
            let gradient = probability - if class == target { 1.0 } else { 0.0 };
            self.bias[class] -= learning_rate * gradient;
            for &token in &tokens {
                self.weights[class][token] -= learning_rate * gradient * scale;
            }
        }

        -predicted[target].max(f32::MIN_POSITIVE).ln()
    }

    /// Keeps the non-padding tokens the classifier has weights for.
    fn tokens(&self, sequence: &[u32]) -> Vec<usize> {
        sequence
            .iter()
            .map(|&token| token as usize)
            .filter(|&token| token != 0 && token <= self.vocabulary_size)
            .collect()
    }

    fn logits(&self, tokens: &[usize]) -> [f32; 2] {
        let mut logits = self.bias;
        if tokens.is_empty() {
            return logits;
        }

        // Accumulated in f64 so large finite weights cannot overflow the sum.
        let count = tokens.len() as f64;
        for (class, logit) in logits.iter_mut().enumerate() {
            let sum: f64 = tokens.iter().map(|&token| f64::from(self.weights[class][token])).sum();
            *logit = (f64::from(*logit) + sum / count) as f32;
        }

        logits
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::serialization()
                .with_artifact(ArtifactKind::Model)
                .with_message(message))
        };

        if self.sequence_length == 0 {
            return invalid("sequence length must be at least 1");
        }

        let Some(rows) = row_len(self.vocabulary_size) else {
            return invalid("vocabulary size is too large");
        };
        if self.weights.iter().any(|w| w.len() != rows) {
            return invalid("weight rows do not match the vocabulary size");
        }

        let finite = self.bias.iter().chain(self.weights.iter().flatten()).all(|v| v.is_finite());
        if !finite {
            return invalid("parameters must be finite");
        }

        Ok(())
    }
}

impl Model for LinearClassifier {
    fn expected_sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn infer(&self, sequence: &[u32]) -> Result<Probabilities> {
        if sequence.len() != self.sequence_length {
            return Err(Error::invalid_input()
                .with_artifact(ArtifactKind::Model)
                .with_message(format!(
                    "expected a sequence of {} tokens, got {}",
                    self.sequence_length,
                    sequence.len()
                )));
        }

        let tokens = self.tokens(sequence);
        let logits = self.logits(&tokens);
        if !logits.iter().all(|logit| logit.is_finite()) {
            return Err(Error::serialization()
                .with_artifact(ArtifactKind::Model)
                .with_message("model parameters overflow for this input"));
        }

        Ok(Probabilities::from_logits(logits))
    }
}

/// Weight row length: one slot per word plus the padding slot at index `0`.
fn row_len(vocabulary_size: usize) -> Option<usize> {
    vocabulary_size.checked_add(1)
}

impl Artifact for LinearClassifier {
    const KIND: ArtifactKind = ArtifactKind::Model;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let classifier: Self = serde_json::from_slice(bytes).map_err(|err| {
            Error::serialization()
                .with_artifact(Self::KIND)
                .with_message("malformed model file")
                .with_source(err)
        })?;

        classifier.validate()?;
        Ok(classifier)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
