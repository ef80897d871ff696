//! Classifier training and evaluation.

#[cfg(feature = "config")]
use clap::Args;
use polarity_core::{Error, Model, Result, Tokenizer, pad_sequence};
use serde::{Deserialize, Serialize};

use crate::{Corpus, LinearClassifier, TRACING_TARGET_TRAINING, WordTokenizer};

/// Default fixed input width.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 16;

/// Hyperparameters for [`Trainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct TrainingConfig {
    /// Width every encoded sentence is padded or truncated to.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SEQUENCE_LENGTH", default_value_t = DEFAULT_SEQUENCE_LENGTH)
    )]
    pub sequence_length: usize,

    /// Number of passes over the training split.
    #[cfg_attr(feature = "config", arg(long, env = "TRAINING_EPOCHS", default_value_t = 10))]
    pub epochs: usize,

    /// SGD step size.
    #[cfg_attr(feature = "config", arg(long, env = "LEARNING_RATE", default_value_t = 0.1))]
    pub learning_rate: f32,

    /// Share of the corpus held out for validation, in `[0, 1)`.
    #[cfg_attr(feature = "config", arg(long, env = "VALIDATION_SPLIT", default_value_t = 0.1))]
    pub validation_split: f32,
}

impl TrainingConfig {
    /// Sets the sequence length.
    pub fn with_sequence_length(mut self, sequence_length: usize) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    /// Sets the number of epochs.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the validation split.
    pub fn with_validation_split(mut self, validation_split: f32) -> Self {
        self.validation_split = validation_split;
        self
    }

    /// Validates the hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(Error::configuration().with_message(message));

        if self.sequence_length == 0 {
            return invalid("sequence length must be at least 1");
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid("learning rate must be a positive number");
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return invalid("validation split must be in [0, 1)");
        }

        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            epochs: 10,
            learning_rate: 0.1,
            validation_split: 0.1,
        }
    }
}

/// Fits a tokenizer and classifier pair on a corpus.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

/// Padded sequence with its label.
type Sample = (Vec<u32>, u8);

impl Trainer {
    /// Creates a trainer with the given hyperparameters.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Returns the hyperparameters.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains on `corpus` and returns the fitted tokenizer and classifier.
    ///
    /// The vocabulary covers the whole corpus. Every sample whose position
    /// crosses a multiple of `1 / validation_split` is held out, and each
    /// epoch visits the rest in a fixed permutation, so the result only
    /// depends on the corpus and the configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the corpus is empty.
    pub fn fit(&self, corpus: &Corpus) -> Result<(WordTokenizer, LinearClassifier)> {
        self.config.validate()?;
        if corpus.is_empty() {
            return Err(Error::invalid_input().with_message("cannot train on an empty corpus"));
        }

        let tokenizer = WordTokenizer::fit(corpus.texts());
        let mut classifier =
            LinearClassifier::new(self.config.sequence_length, tokenizer.vocabulary_size())?;

        let (training, validation) = self.split(&tokenizer, corpus);
        if training.is_empty() {
            return Err(Error::invalid_input().with_message("validation split leaves no training data"));
        }

        tracing::info!(
            target: TRACING_TARGET_TRAINING,
            vocabulary_size = tokenizer.vocabulary_size(),
            training = training.len(),
            validation = validation.len(),
            sequence_length = self.config.sequence_length,
            "Training classifier"
        );

        let stride = coprime_stride(training.len());
        for epoch in 0..self.config.epochs {
            let offset = epoch % training.len();
            let mut loss = 0.0;

            for step in 0..training.len() {
                let (sequence, label) = &training[(offset + step * stride) % training.len()];
                loss += classifier.step(sequence, *label, self.config.learning_rate);
            }

            let accuracy = accuracy(&classifier, &validation)?;
            tracing::info!(
                target: TRACING_TARGET_TRAINING,
                epoch = epoch + 1,
                loss = loss / training.len() as f32,
                val_accuracy = ?accuracy,
                "Epoch complete"
            );
        }

        Ok((tokenizer, classifier))
    }

    fn split(&self, tokenizer: &WordTokenizer, corpus: &Corpus) -> (Vec<Sample>, Vec<Sample>) {
        let split = f64::from(self.config.validation_split);
        let mut training = Vec::new();
        let mut validation = Vec::new();

        for (position, (text, label)) in corpus.iter().enumerate() {
            let sample = (pad_sequence(&tokenizer.encode(text), self.config.sequence_length), label);

            let held_out = (position as f64 * split).floor() != ((position + 1) as f64 * split).floor();
            if held_out {
                validation.push(sample);
            } else {
                training.push(sample);
            }
        }

        (training, validation)
    }
}

/// Returns the share of `corpus` the pair labels correctly.
///
/// # Errors
///
/// Fails if the corpus is empty or the model rejects an encoded sentence.
pub fn evaluate<T, M>(tokenizer: &T, model: &M, corpus: &Corpus) -> Result<f32>
where
    T: Tokenizer + ?Sized,
    M: Model + ?Sized,
{
    if corpus.is_empty() {
        return Err(Error::invalid_input().with_message("cannot evaluate on an empty corpus"));
    }

    let length = model.expected_sequence_length();
    let mut correct = 0usize;
    for (text, label) in corpus.iter() {
        let sequence = pad_sequence(&tokenizer.encode(text), length);
        if model.infer(&sequence)?.label() == label {
            correct += 1;
        }
    }

    Ok(correct as f32 / corpus.len() as f32)
}

fn accuracy(classifier: &LinearClassifier, samples: &[Sample]) -> Result<Option<f32>> {
    if samples.is_empty() {
        return Ok(None);
    }

    let mut correct = 0usize;
    for (sequence, label) in samples {
        if classifier.infer(sequence)?.label() == *label {
            correct += 1;
        }
    }

    Ok(Some(correct as f32 / samples.len() as f32))
}

/// Smallest stride above `len / 2` that visits every index of `0..len` once.
fn coprime_stride(len: usize) -> usize {
    let mut stride = len / 2 + 1;
    while gcd(stride, len) != 1 {
        stride += 1;
    }
    stride
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for round in 0..20 {
            texts.push(format!("a great and wonderful film {round}"));
            labels.push(1);
            texts.push(format!("a dull and awful film {round}"));
            labels.push(0);
        }

        Corpus::new(texts, labels).unwrap()
    }

    fn config() -> TrainingConfig {
        TrainingConfig::default()
            .with_sequence_length(8)
            .with_epochs(30)
            .with_learning_rate(0.5)
    }

    #[test]
    fn learns_a_separable_corpus() -> anyhow::Result<()> {
        let corpus = corpus();
        let (tokenizer, classifier) = Trainer::new(config()).fit(&corpus)?;

        assert_eq!(classifier.expected_sequence_length(), 8);
        assert_eq!(classifier.vocabulary_size(), tokenizer.vocabulary_size());
        assert_eq!(evaluate(&tokenizer, &classifier, &corpus)?, 1.0);

        let great = pad_sequence(&tokenizer.encode("wonderful"), 8);
        assert!(classifier.infer(&great)?.positive > 0.5);

        Ok(())
    }

    #[test]
    fn training_is_deterministic() -> anyhow::Result<()> {
        let corpus = corpus();
        let trainer = Trainer::new(config());

        let (_, first) = trainer.fit(&corpus)?;
        let (_, second) = trainer.fit(&corpus)?;
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn holds_out_an_even_share() {
        let corpus = corpus();
        let trainer = Trainer::new(TrainingConfig::default());
        let tokenizer = WordTokenizer::fit(corpus.texts());

        let (training, validation) = trainer.split(&tokenizer, &corpus);
        assert_eq!(validation.len(), 4);
        assert_eq!(training.len(), 36);
    }

    #[test]
    fn rejects_invalid_configuration_and_data() {
        assert!(TrainingConfig::default().with_epochs(0).validate().is_err());
        assert!(TrainingConfig::default().with_validation_split(1.0).validate().is_err());
        assert!(TrainingConfig::default().with_learning_rate(f32::NAN).validate().is_err());
        assert!(Trainer::default().fit(&Corpus::default()).is_err());
    }

    #[test]
    fn strides_cover_every_index() {
        for len in 1..50 {
            let stride = coprime_stride(len);
            let mut seen: Vec<usize> = (0..len).map(|step| (step * stride) % len).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..len).collect::<Vec<_>>());
        }
    }
}
