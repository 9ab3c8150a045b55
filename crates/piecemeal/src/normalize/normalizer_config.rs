//! # Normalizer Configuration

use serde::{Deserialize, Serialize};

/// Text normalization switches.
///
/// The default is the BERT uncased normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Drop control characters and map whitespace to `' '`.
    pub clean_text: bool,

    /// Surround CJK ideographs with spaces.
    pub handle_chinese_chars: bool,

    /// Lowercase the text.
    pub lowercase: bool,

    /// Strip accents; when unset, follows `lowercase`.
    pub strip_accents: Option<bool>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self::bert_uncased()
    }
}

impl NormalizerConfig {
    /// The BERT uncased normalizer.
    pub fn bert_uncased() -> Self {
        Self {
            clean_text: true,
            handle_chinese_chars: true,
            lowercase: true,
            strip_accents: None,
        }
    }

    /// The BERT cased normalizer.
    pub fn bert_cased() -> Self {
        Self {
            lowercase: false,
            ..Self::bert_uncased()
        }
    }

    /// A normalizer which leaves text unchanged.
    pub fn passthrough() -> Self {
        Self {
            clean_text: false,
            handle_chinese_chars: false,
            lowercase: false,
            strip_accents: Some(false),
        }
    }

    /// Set `lowercase`.
    pub fn with_lowercase(
        self,
        lowercase: bool,
    ) -> Self {
        Self { lowercase, ..self }
    }

    /// Set `strip_accents`.
    pub fn with_strip_accents(
        self,
        strip_accents: Option<bool>,
    ) -> Self {
        Self {
            strip_accents,
            ..self
        }
    }

    /// Will accents be stripped?
    pub fn strips_accents(&self) -> bool {
        self.strip_accents.unwrap_or(self.lowercase)
    }

    /// Does this configuration change any text?
    pub fn is_passthrough(&self) -> bool {
        !(self.clean_text || self.handle_chinese_chars || self.lowercase || self.strips_accents())
    }
}
