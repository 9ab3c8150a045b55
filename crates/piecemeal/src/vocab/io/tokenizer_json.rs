//! # Hugging Face ``tokenizer.json`` Loader
//!
//! Supports the `WordPiece` and (character-level) `BPE` models, with the
//! `BertNormalizer` or `Lowercase` normalizers.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::Deserialize;

use crate::{
    PMResult,
    PiecemealError,
    normalize::NormalizerConfig,
    vocab::{
        BpeConfig,
        ModelConfig,
        SpecialTokenNames,
        WordPieceConfig,
        io::{AddedTokenSpec, VocabArtifact},
        model_config::{DEFAULT_CONTINUING_SUBWORD_PREFIX, DEFAULT_MAX_INPUT_CHARS_PER_WORD},
    },
};

/// The supported ``tokenizer.json`` format version.
pub const TOKENIZER_JSON_VERSION: &str = "1.0";

#[derive(Debug, Deserialize)]
struct TokenizerJson {
    version: String,

    #[serde(default)]
    added_tokens: Vec<JsonAddedToken>,

    #[serde(default)]
    normalizer: Option<JsonNormalizer>,

    #[serde(default)]
    pre_tokenizer: Option<JsonTyped>,

    #[serde(default)]
    post_processor: Option<JsonPostProcessor>,

    #[serde(default)]
    padding: Option<JsonPadding>,

    model: JsonModel,
}

#[derive(Debug, Deserialize)]
struct JsonAddedToken {
    id: usize,
    content: String,
    #[serde(default)]
    single_word: bool,
    #[serde(default)]
    normalized: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum JsonNormalizer {
    BertNormalizer {
        #[serde(default = "enabled")]
        clean_text: bool,
        #[serde(default = "enabled")]
        handle_chinese_chars: bool,
        #[serde(default)]
        strip_accents: Option<bool>,
        #[serde(default = "enabled")]
        lowercase: bool,
    },
    Lowercase,
    #[serde(other)]
    Unsupported,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct JsonTyped {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
enum TemplatePiece {
    SpecialToken { id: String },
    Sequence {},
}

#[derive(Debug, Deserialize)]
struct JsonPostProcessor {
    #[serde(default)]
    cls: Option<(String, usize)>,
    #[serde(default)]
    sep: Option<(String, usize)>,
    #[serde(default)]
    single: Vec<TemplatePiece>,
}

#[derive(Debug, Deserialize)]
struct JsonPadding {
    #[serde(default)]
    pad_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonMerge {
    Joined(String),
    Split((String, String)),
}

#[derive(Debug, Deserialize)]
struct JsonModel {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    unk_token: Option<String>,
    #[serde(default)]
    continuing_subword_prefix: Option<String>,
    #[serde(default)]
    max_input_chars_per_word: Option<usize>,
    #[serde(default)]
    end_of_word_suffix: Option<String>,
    #[serde(default)]
    fuse_unk: bool,
    vocab: BTreeMap<String, usize>,
    #[serde(default)]
    merges: Vec<JsonMerge>,
}

impl JsonPostProcessor {
    /// The `(start, end)` framing tokens, if declared.
    fn framing(&self) -> (Option<String>, Option<String>) {
        if self.cls.is_some() || self.sep.is_some() {
            return (
                self.cls.as_ref().map(|(t, _)| t.clone()),
                self.sep.as_ref().map(|(t, _)| t.clone()),
            );
        }
        let mut start = None;
        let mut end = None;
        let mut seen_sequence = false;
        for piece in &self.single {
            match piece {
                TemplatePiece::Sequence {} => seen_sequence = true,
                TemplatePiece::SpecialToken { id } if !seen_sequence => {
                    start.get_or_insert_with(|| id.clone());
                }
                TemplatePiece::SpecialToken { id } => {
                    end.get_or_insert_with(|| id.clone());
                }
            }
        }
        (start, end)
    }
}

fn unsupported<S: AsRef<str>>(what: S) -> PiecemealError {
    PiecemealError::corrupt(format!("tokenizer.json: unsupported {}", what.as_ref()))
}

/// Pick the first candidate present in the vocab, or the first candidate.
fn first_present(
    vocab: &BTreeMap<String, usize>,
    added: &[JsonAddedToken],
    candidates: &[&str],
) -> String {
    candidates
        .iter()
        .find(|c| vocab.contains_key(**c) || added.iter().any(|t| t.content == **c))
        .or(candidates.first())
        .map(|c| c.to_string())
        .unwrap_or_default()
}

/// Read a Hugging Face ``tokenizer.json`` into a [`VocabArtifact`].
///
/// ## Returns
/// The artifact; or [`PiecemealError::CorruptVocabulary`] if the file is
/// malformed, or uses a version, model, normalizer, or added-token
/// feature this loader does not support.
pub fn read_tokenizer_json<R: Read>(reader: R) -> PMResult<VocabArtifact> {
    let tok: TokenizerJson = serde_json::from_reader(reader)
        .map_err(|e| PiecemealError::corrupt(format!("malformed tokenizer.json: {e}")))?;
    tokenizer_json_to_artifact(tok)
}

/// Parse a Hugging Face ``tokenizer.json`` string into a [`VocabArtifact`].
pub fn tokenizer_json_from_str(json: &str) -> PMResult<VocabArtifact> {
    read_tokenizer_json(json.as_bytes())
}

/// Read a Hugging Face ``tokenizer.json`` file into a [`VocabArtifact`].
pub fn load_tokenizer_json_path<P: AsRef<Path>>(path: P) -> PMResult<VocabArtifact> {
    read_tokenizer_json(BufReader::new(File::open(path)?))
}

fn tokenizer_json_to_artifact(tok: TokenizerJson) -> PMResult<VocabArtifact> {
    if tok.version != TOKENIZER_JSON_VERSION {
        return Err(unsupported(format!("version {:?}", tok.version)));
    }

    if let Some(pre) = &tok.pre_tokenizer {
        match pre.kind.as_str() {
            "BertPreTokenizer" | "Whitespace" | "WhitespaceSplit" => {}
            "ByteLevel" => return Err(unsupported("byte-level pre-tokenizer")),
            other => log::warn!("tokenizer.json: pre-tokenizer {other:?} treated as BertPreTokenizer"),
        }
    }

    let normalizer = match tok.normalizer {
        None => NormalizerConfig::passthrough(),
        Some(JsonNormalizer::BertNormalizer {
            clean_text,
            handle_chinese_chars,
            strip_accents,
            lowercase,
        }) => NormalizerConfig {
            clean_text,
            handle_chinese_chars,
            lowercase,
            strip_accents,
        },
        Some(JsonNormalizer::Lowercase) => NormalizerConfig::passthrough().with_lowercase(true),
        Some(JsonNormalizer::Unsupported) => return Err(unsupported("normalizer")),
    };

    if let Some(t) = tok.added_tokens.iter().find(|t| t.single_word) {
        return Err(unsupported(format!(
            "single_word added token {:?}",
            t.content
        )));
    }

    let model = tok.model;
    let is_bpe = match model.kind.as_deref() {
        None | Some("WordPiece") => false,
        Some("BPE") => true,
        Some(other) => return Err(unsupported(format!("model type {other:?}"))),
    };

    let (model_config, merges) = if is_bpe {
        let merges = model
            .merges
            .into_iter()
            .map(|m| match m {
                JsonMerge::Split(pair) => Ok(pair),
                JsonMerge::Joined(joined) => joined
                    .split_once(' ')
                    .map(|(l, r)| (l.to_string(), r.to_string()))
                    .ok_or_else(|| PiecemealError::corrupt(format!("malformed merge {joined:?}"))),
            })
            .collect::<PMResult<Vec<_>>>()?;
        let cfg = BpeConfig {
            continuing_subword_prefix: model.continuing_subword_prefix,
            end_of_word_suffix: model.end_of_word_suffix,
            fuse_unknown: model.fuse_unk,
        };
        (ModelConfig::Bpe(cfg), merges)
    } else {
        if !model.merges.is_empty() {
            return Err(PiecemealError::corrupt(
                "a WordPiece model must not carry merge rules",
            ));
        }
        let cfg = WordPieceConfig {
            continuing_subword_prefix: model
                .continuing_subword_prefix
                .unwrap_or_else(|| DEFAULT_CONTINUING_SUBWORD_PREFIX.to_string()),
            max_input_chars_per_word: model
                .max_input_chars_per_word
                .unwrap_or(DEFAULT_MAX_INPUT_CHARS_PER_WORD),
        };
        (ModelConfig::WordPiece(cfg), Vec::new())
    };

    let vocab_map = model.vocab;
    let added = tok.added_tokens;

    let (start, end) = tok
        .post_processor
        .as_ref()
        .map(JsonPostProcessor::framing)
        .unwrap_or_default();

    let special_tokens = SpecialTokenNames {
        unknown: model
            .unk_token
            .unwrap_or_else(|| first_present(&vocab_map, &added, &["[UNK]", "<unk>"])),
        padding: tok
            .padding
            .and_then(|p| p.pad_token)
            .unwrap_or_else(|| first_present(&vocab_map, &added, &["[PAD]", "<pad>"])),
        start: start.unwrap_or_else(|| first_present(&vocab_map, &added, &["[CLS]", "<s>"])),
        end: end.unwrap_or_else(|| first_present(&vocab_map, &added, &["[SEP]", "</s>"])),
        mask: ["[MASK]", "<mask>"]
            .iter()
            .find(|c| vocab_map.contains_key(**c) || added.iter().any(|t| t.content == **c))
            .map(|c| c.to_string()),
    };

    let mut added_tokens: Vec<AddedTokenSpec> = added
        .into_iter()
        .map(|t| AddedTokenSpec {
            content: t.content,
            id: Some(t.id),
            normalized: t.normalized,
        })
        .collect();
    added_tokens.sort_by_key(|t| t.id);

    Ok(VocabArtifact {
        model: model_config,
        special_tokens,
        vocab: vocab_map.into_iter().collect(),
        merges,
        normalizer,
        added_tokens,
    })
}
