//! Labelled training sentences.

use std::io::Read;

use flate2::read::GzDecoder;
use polarity_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Label of a negative sentence.
pub const NEGATIVE: u8 = 0;
/// Label of a positive sentence.
pub const POSITIVE: u8 = 1;

/// Sentences paired with their sentiment label.
///
/// Serialized as the JSON pair `[texts, labels]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "(Vec<String>, Vec<u8>)",
    into = "(Vec<String>, Vec<u8>)"
)]
pub struct Corpus {
    texts: Vec<String>,
    labels: Vec<u8>,
}

impl Corpus {
    /// Creates a corpus from parallel texts and labels.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the lengths differ or a label is not
    /// [`NEGATIVE`] or [`POSITIVE`].
    pub fn new(texts: Vec<String>, labels: Vec<u8>) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(Error::invalid_input().with_message(format!(
                "corpus has {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        if let Some(label) = labels.iter().find(|&&l| l > POSITIVE) {
            return Err(Error::invalid_input().with_message(format!("unknown label {label}")));
        }

        Ok(Self { texts, labels })
    }

    /// Parses the `rt-polaritydata` gzip tarball.
    ///
    /// Members whose name ends in `neg` are negative and those ending in `pos`
    /// are positive; every other member is skipped. Each line is decoded as
    /// Latin-1 and trimmed.
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        let mut corpus = Self::default();

        for entry in archive.entries().map_err(archive_error)? {
            let mut entry = entry.map_err(archive_error)?;
            let name = entry.path().map_err(archive_error)?.to_string_lossy().into_owned();

            let label = if name.ends_with("neg") {
                NEGATIVE
            } else if name.ends_with("pos") {
                POSITIVE
            } else {
                continue;
            };

            let mut raw = Vec::new();
            entry.read_to_end(&mut raw).map_err(archive_error)?;

            for line in raw.split_inclusive(|&byte| byte == b'\n') {
                let text: String = line.iter().map(|&byte| char::from(byte)).collect();
                corpus.texts.push(text.trim().to_owned());
                corpus.labels.push(label);
            }
        }

        Ok(corpus)
    }

    /// Decodes a corpus from its JSON form.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| {
            Error::serialization()
                .with_message("malformed corpus file")
                .with_source(err)
        })
    }

    /// Encodes the corpus as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Returns the number of sentences.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Returns whether the corpus holds no sentences.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Returns the sentences.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Returns the labels, parallel to [`Corpus::texts`].
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Iterates over `(text, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.texts.iter().map(String::as_str).zip(self.labels.iter().copied())
    }
}

impl TryFrom<(Vec<String>, Vec<u8>)> for Corpus {
    type Error = Error;

    fn try_from((texts, labels): (Vec<String>, Vec<u8>)) -> Result<Self> {
        Self::new(texts, labels)
    }
}

impl From<Corpus> for (Vec<String>, Vec<u8>) {
    fn from(corpus: Corpus) -> Self {
        (corpus.texts, corpus.labels)
    }
}

fn archive_error(err: std::io::Error) -> Error {
    Error::serialization()
        .with_message("malformed corpus archive")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn archive(members: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data)?;
        }

        let mut encoder = builder.into_inner()?;
        encoder.flush()?;
        Ok(encoder.finish()?)
    }

    #[test]
    fn parses_labelled_members() -> anyhow::Result<()> {
        let bytes = archive(&[
            ("rt-polaritydata/README", &b"ignored\n"[..]),
            ("rt-polaritydata/rt-polarity.neg", &b"a dull film \nbad\n"[..]),
            ("rt-polaritydata/rt-polarity.pos", &b"caf\xe9 delight\n  great  "[..]),
        ])?;

        let corpus = Corpus::from_archive(&bytes)?;

        assert_eq!(corpus.texts(), ["a dull film", "bad", "caf\u{e9} delight", "great"]);
        assert_eq!(corpus.labels(), [NEGATIVE, NEGATIVE, POSITIVE, POSITIVE]);

        Ok(())
    }

    #[test]
    fn json_form_is_a_texts_labels_pair() -> anyhow::Result<()> {
        let corpus = Corpus::new(vec!["good".to_owned(), "bad".to_owned()], vec![1, 0])?;
        let bytes = corpus.to_json()?;

        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&bytes)?,
            serde_json::json!([["good", "bad"], [1, 0]])
        );
        assert_eq!(Corpus::from_json(&bytes)?, corpus);

        Ok(())
    }

    #[test]
    fn rejects_inconsistent_data() {
        assert!(Corpus::new(vec!["good".to_owned()], vec![]).is_err());
        assert!(Corpus::new(vec!["good".to_owned()], vec![2]).is_err());
        assert!(Corpus::from_json(br#"[["good"], [1, 0]]"#).is_err());
        assert!(Corpus::from_archive(b"not an archive").is_err());
    }
}
