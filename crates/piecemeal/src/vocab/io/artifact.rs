//! # Native Vocabulary Artifact

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    PiecemealError,
    normalize::{AddedToken, NormalizerConfig},
    types::{TokenType, try_token_from_usize},
    vocab::{ModelConfig, SpecialTokenNames, TokenizerVocab, WordVocab},
};

/// An added token declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedTokenSpec {
    /// The literal text.
    pub content: String,

    /// The id; when absent, the existing id of `content` is used,
    /// or a new id is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,

    /// Match ASCII case-insensitively.
    #[serde(default)]
    pub normalized: bool,
}

/// The serialized form of a [`TokenizerVocab`].
///
/// All loaders produce an artifact; [`VocabArtifact::into_vocab`] is the
/// single validation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabArtifact {
    /// The segmentation model.
    #[serde(default)]
    pub model: ModelConfig,

    /// The special token names.
    #[serde(default)]
    pub special_tokens: SpecialTokenNames,

    /// The `(token, id)` entries; ids contiguous from 0.
    pub vocab: Vec<(String, usize)>,

    /// The ordered BPE merges; rank is list position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<(String, String)>,

    /// The normalizer config.
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Added token declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_tokens: Vec<AddedTokenSpec>,
}

impl VocabArtifact {
    /// Validate and build a [`TokenizerVocab`].
    ///
    /// ## Returns
    /// The vocabulary, or [`PiecemealError::CorruptVocabulary`] if any
    /// structural check fails; no partially built vocabulary escapes.
    pub fn into_vocab<T: TokenType>(self) -> PMResult<TokenizerVocab<T>> {
        let mut words: WordVocab<T> = WordVocab::from_entries(self.vocab)?;

        let mut added = Vec::with_capacity(self.added_tokens.len());
        for spec in self.added_tokens {
            let id = match spec.id {
                Some(id) if id == words.len() && !words.contains(&spec.content) => {
                    words.push(&spec.content)?
                }
                Some(id) => {
                    let id: T = try_token_from_usize(id).map_err(|_| {
                        PiecemealError::corrupt(format!("added token id {id} overflows"))
                    })?;
                    if words.id_to_token(id) != Some(spec.content.as_str()) {
                        return Err(PiecemealError::corrupt(format!(
                            "added token {:?} conflicts with vocabulary id {id}",
                            spec.content
                        )));
                    }
                    id
                }
                None => words.push(&spec.content)?,
            };
            added.push(AddedToken {
                content: spec.content,
                id,
                normalized: spec.normalized,
            });
        }

        TokenizerVocab::new(
            self.model,
            words,
            &self.merges,
            self.special_tokens,
            added,
            self.normalizer,
        )
    }

    /// Capture a [`TokenizerVocab`] as an artifact.
    ///
    /// Merges are recovered in rank order.
    pub fn from_vocab<T: TokenType>(vocab: &TokenizerVocab<T>) -> Self {
        let words = vocab.words();
        let entries = words
            .iter()
            .filter_map(|(token, id)| id.to_usize().map(|id| (token.to_string(), id)))
            .collect();

        let mut ranked: Vec<_> = vocab.merges().iter().collect();
        ranked.sort_by_key(|(_, rule)| rule.rank);
        let merges = ranked
            .into_iter()
            .filter_map(|(&(l, r), _)| {
                Some((
                    words.id_to_token(l)?.to_string(),
                    words.id_to_token(r)?.to_string(),
                ))
            })
            .collect();

        let added_tokens = vocab
            .added_tokens()
            .tokens()
            .iter()
            .map(|t| AddedTokenSpec {
                content: t.content.clone(),
                id: t.id.to_usize(),
                normalized: t.normalized,
            })
            .collect();

        Self {
            model: vocab.model().clone(),
            special_tokens: vocab.special_names().clone(),
            vocab: entries,
            merges,
            normalizer: *vocab.normalizer_config(),
            added_tokens,
        }
    }

    /// Read an artifact from JSON.
    pub fn read_json<R: Read>(reader: R) -> PMResult<Self> {
        serde_json::from_reader(reader).map_err(corrupt_json)
    }

    /// Parse an artifact from a JSON string.
    pub fn from_json_str(json: &str) -> PMResult<Self> {
        serde_json::from_str(json).map_err(corrupt_json)
    }

    /// Write an artifact as JSON.
    pub fn write_json<W: Write>(
        &self,
        writer: W,
    ) -> PMResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

fn corrupt_json(err: serde_json::Error) -> PiecemealError {
    if err.is_io() {
        PiecemealError::Json(err)
    } else {
        PiecemealError::corrupt(format!("malformed artifact: {err}"))
    }
}

/// Load a native JSON artifact from a path.
pub fn load_artifact_path<P: AsRef<Path>>(path: P) -> PMResult<VocabArtifact> {
    let reader = BufReader::new(File::open(path)?);
    VocabArtifact::read_json(reader)
}

/// Save a [`TokenizerVocab`] as a native JSON artifact.
pub fn save_vocabulary_path<T: TokenType, P: AsRef<Path>>(
    vocab: &TokenizerVocab<T>,
    path: P,
) -> PMResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    VocabArtifact::from_vocab(vocab).write_json(&mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::BpeConfig;

    const BERT_ARTIFACT: &str = r###"{
        "vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 2], ["[SEP]", 3], ["play", 4], ["##ing", 5]]
    }"###;

    #[test]
    fn test_defaults() {
        let vocab: TokenizerVocab<u32> = VocabArtifact::from_json_str(BERT_ARTIFACT)
            .unwrap()
            .into_vocab()
            .unwrap();
        assert_eq!(vocab.model(), &ModelConfig::default());
        assert_eq!(vocab.normalizer_config(), &NormalizerConfig::default());
        assert_eq!(vocab.specials().start().id, 2);
    }

    #[test]
    fn test_duplicate_id() {
        let json = r#"{"vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 2], ["[SEP]", 2]]}"#;
        let err = VocabArtifact::from_json_str(json)
            .unwrap()
            .into_vocab::<u32>()
            .unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = VocabArtifact::from_json_str(r#"{"vocab": 7}"#).unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }

    #[test]
    fn test_added_tokens() {
        let json = r#"{
            "vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 2], ["[SEP]", 3]],
            "added_tokens": [
                {"content": "[SEP]", "id": 3},
                {"content": "<new>", "normalized": true},
                {"content": "<next>", "id": 5}
            ]
        }"#;
        let vocab: TokenizerVocab<u32> = VocabArtifact::from_json_str(json)
            .unwrap()
            .into_vocab()
            .unwrap();
        assert_eq!(vocab.lookup("<new>"), Some(4));
        assert_eq!(vocab.lookup("<next>"), Some(5));
        assert_eq!(vocab.added_tokens().len(), 6);
    }

    #[test]
    fn test_added_token_conflict() {
        let json = r#"{
            "vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 2], ["[SEP]", 3]],
            "added_tokens": [{"content": "<x>", "id": 2}]
        }"#;
        let err = VocabArtifact::from_json_str(json)
            .unwrap()
            .into_vocab::<u32>()
            .unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir::TempDir::new("piecemeal").unwrap();
        let path = dir.path().join("bpe.json");

        let artifact = VocabArtifact {
            model: ModelConfig::Bpe(BpeConfig::default()),
            special_tokens: SpecialTokenNames::roberta(),
            vocab: ["<unk>", "<pad>", "<s>", "</s>", "l", "o", "w", "lo", "low"]
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            merges: vec![
                ("l".to_string(), "o".to_string()),
                ("lo".to_string(), "w".to_string()),
            ],
            normalizer: NormalizerConfig::passthrough(),
            added_tokens: vec![],
        };
        let vocab: TokenizerVocab<u32> = artifact.into_vocab().unwrap();

        save_vocabulary_path(&vocab, &path).unwrap();
        let reloaded: TokenizerVocab<u32> = load_artifact_path(&path)
            .unwrap()
            .into_vocab()
            .unwrap();

        assert_eq!(reloaded, vocab);
    }
}
