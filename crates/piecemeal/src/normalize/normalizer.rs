//! # Text Normalizer

use unicode_normalization::char::decompose_canonical;

use crate::normalize::{
    NormalizedText,
    NormalizerConfig,
    char_classes::{is_cjk, is_control, is_nonspacing_mark, is_whitespace},
};

/// Applies a [`NormalizerConfig`] to text.
///
/// Stages, per input char:
/// 1. clean: drop `\0`, `U+FFFD`, and control chars; whitespace becomes `' '`,
/// 2. CJK: surround ideographs with spaces,
/// 3. accents: canonical decomposition, dropping nonspacing marks,
/// 4. lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl From<NormalizerConfig> for Normalizer {
    fn from(config: NormalizerConfig) -> Self {
        Self::new(config)
    }
}

impl Normalizer {
    /// Create a normalizer for the config.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// The config.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize `text`, aligning offsets relative to `base_offset`.
    ///
    /// ## Arguments
    /// * `text` - the raw text.
    /// * `base_offset` - the byte offset of `text` in the caller's input.
    ///
    /// ## Returns
    /// The normalized text, with per-byte alignment to the input.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text)))]
    pub fn normalize(
        &self,
        text: &str,
        base_offset: usize,
    ) -> NormalizedText {
        if self.config.is_passthrough() {
            return NormalizedText::identity(text, base_offset);
        }

        let strip_accents = self.config.strips_accents();
        let mut out = NormalizedText::with_capacity(text.len() + text.len() / 4);

        for (idx, c) in text.char_indices() {
            let start = base_offset + idx;
            let original = start..start + c.len_utf8();

            let c = if self.config.clean_text {
                if c == '\0' || c == '\u{FFFD}' || is_control(c) {
                    continue;
                }
                if is_whitespace(c) { ' ' } else { c }
            } else {
                c
            };

            let pad = self.config.handle_chinese_chars && is_cjk(c);
            if pad {
                out.push(' ', original.clone());
            }

            let mut emit = |d: char| {
                if self.config.lowercase {
                    for lc in d.to_lowercase() {
                        out.push(lc, original.clone());
                    }
                } else {
                    out.push(d, original.clone());
                }
            };
            if strip_accents {
                decompose_canonical(c, |d| {
                    if !is_nonspacing_mark(d) {
                        emit(d);
                    }
                });
            } else {
                emit(c);
            }

            if pad {
                out.push(' ', original);
            }
        }

        out
    }

    /// Normalize `text` to a plain string.
    pub fn normalize_str(
        &self,
        text: &str,
    ) -> String {
        self.normalize(text, 0).as_str().to_string()
    }
}
