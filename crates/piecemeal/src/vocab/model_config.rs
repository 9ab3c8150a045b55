//! # Segmentation Model Configuration

use serde::{Deserialize, Serialize};

/// Default continuation prefix for `WordPiece` vocabularies.
pub const DEFAULT_CONTINUING_SUBWORD_PREFIX: &str = "##";

/// Default per-word character limit for `WordPiece` segmentation.
pub const DEFAULT_MAX_INPUT_CHARS_PER_WORD: usize = 100;

/// `WordPiece` segmentation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPieceConfig {
    /// The marker carried by non-initial subword entries.
    pub continuing_subword_prefix: String,

    /// Words with more characters than this become a single unknown token.
    pub max_input_chars_per_word: usize,
}

impl Default for WordPieceConfig {
    fn default() -> Self {
        Self {
            continuing_subword_prefix: DEFAULT_CONTINUING_SUBWORD_PREFIX.to_string(),
            max_input_chars_per_word: DEFAULT_MAX_INPUT_CHARS_PER_WORD,
        }
    }
}

/// BPE segmentation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BpeConfig {
    /// A marker carried by non-initial symbols, if the vocabulary uses one.
    pub continuing_subword_prefix: Option<String>,

    /// A marker carried by the final symbol of a word, if any.
    pub end_of_word_suffix: Option<String>,

    /// Collapse runs of unknown symbols into one unknown token.
    pub fuse_unknown: bool,
}

/// The segmentation algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(tag = "type")]
pub enum ModelConfig {
    /// Greedy longest-match-first subword lookup.
    #[serde(rename = "WordPiece")]
    #[strum(serialize = "WordPiece")]
    WordPiece(WordPieceConfig),

    /// Ranked pairwise merging.
    #[serde(rename = "BPE")]
    #[strum(serialize = "BPE")]
    Bpe(BpeConfig),
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::WordPiece(WordPieceConfig::default())
    }
}

impl ModelConfig {
    /// Is this a BPE model?
    pub fn is_bpe(&self) -> bool {
        matches!(self, Self::Bpe(_))
    }

    /// The continuation prefix, if any.
    pub fn continuing_subword_prefix(&self) -> Option<&str> {
        match self {
            Self::WordPiece(cfg) => Some(cfg.continuing_subword_prefix.as_str()),
            Self::Bpe(cfg) => cfg.continuing_subword_prefix.as_deref(),
        }
        .filter(|p| !p.is_empty())
    }

    /// The end-of-word suffix, if any.
    pub fn end_of_word_suffix(&self) -> Option<&str> {
        match self {
            Self::WordPiece(_) => None,
            Self::Bpe(cfg) => cfg.end_of_word_suffix.as_deref().filter(|s| !s.is_empty()),
        }
    }
}
