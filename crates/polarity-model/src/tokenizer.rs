//! Word-level tokenizer with a frequency-ranked vocabulary.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use polarity_core::{Artifact, ArtifactKind, Error, Result, Tokenizer};
use serde::{Deserialize, Serialize};

/// Characters replaced by whitespace before splitting.
const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// A fitted vocabulary mapping lowercased words to integer indices.
///
/// Indices are assigned by descending word frequency, ties broken by the
/// order words were first seen, starting at `1`. Index `0` is reserved for
/// padding and is never produced by [`Tokenizer::encode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordTokenizer {
    word_counts: Vec<(String, u64)>,
    word_index: HashMap<String, u32>,
}

/// On-disk form. The index is derived, so only the counts are stored.
#[derive(Serialize, Deserialize)]
struct TokenizerFile {
    word_counts: Vec<(String, u64)>,
}

impl WordTokenizer {
    /// Fits a vocabulary over the given texts.
    pub fn fit<I>(texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut word_counts: Vec<(String, u64)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in split_words(text.as_ref()) {
                match positions.entry(word) {
                    Entry::Occupied(entry) => word_counts[*entry.get()].1 += 1,
                    Entry::Vacant(entry) => {
                        word_counts.push((entry.key().clone(), 1));
                        entry.insert(word_counts.len() - 1);
                    }
                }
            }
        }

        Self::index(word_counts)
    }

    /// Rebuilds a tokenizer from stored word counts.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a word appears more than once.
    pub fn from_word_counts(word_counts: Vec<(String, u64)>) -> Result<Self> {
        let tokenizer = Self::index(word_counts);

        if tokenizer.word_index.len() != tokenizer.word_counts.len() {
            return Err(Error::serialization()
                .with_artifact(ArtifactKind::Tokenizer)
                .with_message("word counts contain duplicate words"));
        }

        Ok(tokenizer)
    }

    /// Returns the word counts in first-seen order.
    pub fn word_counts(&self) -> &[(String, u64)] {
        &self.word_counts
    }

    /// Returns the index of a word, if it is in the vocabulary.
    pub fn word_index(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }

    fn index(word_counts: Vec<(String, u64)>) -> Self {
        let mut ranked: Vec<usize> = (0..word_counts.len()).collect();
        // Stable, so equal counts keep first-seen order.
        ranked.sort_by(|&a, &b| word_counts[b].1.cmp(&word_counts[a].1));

        let word_index = ranked
            .into_iter()
            .zip(1u32..)
            .map(|(position, index)| (word_counts[position].0.clone(), index))
            .collect();

        Self {
            word_counts,
            word_index,
        }
    }
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        split_words(text)
            .into_iter()
            .filter_map(|word| self.word_index(&word))
            .collect()
    }

    fn vocabulary_size(&self) -> usize {
        self.word_counts.len()
    }
}

impl Artifact for WordTokenizer {
    const KIND: ArtifactKind = ArtifactKind::Tokenizer;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file: TokenizerFile = serde_json::from_slice(bytes).map_err(|err| {
            Error::serialization()
                .with_artifact(Self::KIND)
                .with_message("malformed tokenizer file")
                .with_source(err)
        })?;

        Self::from_word_counts(file.word_counts)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let file = TokenizerFile {
            word_counts: self.word_counts.clone(),
        };

        Ok(serde_json::to_vec(&file)?)
    }
}

/// Lowercases, strips punctuation and splits on whitespace.
fn split_words(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if FILTERS.contains(c) { ' ' } else { c })
        .collect();

    normalized.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_then_first_seen() {
        let tokenizer = WordTokenizer::fit(["the cat sat", "The dog, the END!", "dog"]);

        assert_eq!(tokenizer.word_index("the"), Some(1));
        assert_eq!(tokenizer.word_index("dog"), Some(2));
        assert_eq!(tokenizer.word_index("cat"), Some(3));
        assert_eq!(tokenizer.word_index("sat"), Some(4));
        assert_eq!(tokenizer.word_index("end"), Some(5));
        assert_eq!(tokenizer.vocabulary_size(), 5);
        assert_eq!(tokenizer.word_counts()[0], ("the".to_owned(), 3));
    }

    #[test]
    fn unknown_words_are_dropped() {
        let tokenizer = WordTokenizer::fit(["hello world"]);

        assert_eq!(tokenizer.encode("Hello, brave new World"), vec![1, 2]);
        assert!(tokenizer.encode("nothing known").is_empty());
        assert!(tokenizer.encode("").is_empty());
    }

    #[test]
    fn stored_form_rebuilds_the_same_index() -> anyhow::Result<()> {
        let tokenizer = WordTokenizer::fit(["a b b c c c"]);
        let bytes = tokenizer.to_bytes()?;

        let json: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(json["word_counts"][0], serde_json::json!(["a", 1]));

        let decoded = WordTokenizer::from_bytes(&bytes)?;
        assert_eq!(decoded, tokenizer);
        assert_eq!(decoded.word_index("c"), Some(1));

        Ok(())
    }

    #[test]
    fn duplicate_words_are_rejected() {
        let bytes = br#"{"word_counts": [["a", 1], ["a", 2]]}"#;
        let err = WordTokenizer::from_bytes(bytes).unwrap_err();
        assert_eq!(err.kind(), polarity_core::ErrorKind::Serialization);

        assert!(WordTokenizer::from_bytes(b"not json").is_err());
    }
}
