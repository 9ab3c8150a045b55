//! # Encode Options
//!
//! Post-processing options for [`TokenEncoder::try_encode_batch`](crate::encoders::TokenEncoder::try_encode_batch).

use serde::{Deserialize, Serialize};

use crate::{PMResult, PiecemealError};

/// The default maximum sequence length, inclusive of special tokens.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// The default per-input byte ceiling.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1 << 20;

/// How rows of a batch are padded.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PaddingStrategy {
    /// Rows keep their own length; the batch may be ragged.
    #[default]
    DoNotPad,

    /// Pad every row to the longest row of the batch.
    Longest,

    /// Pad every row to `max_length`.
    MaxLength,
}

/// Options for framing, truncating and padding encoded rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeOptions {
    /// Frame each row with the start and end tokens.
    pub add_special_tokens: bool,

    /// Cut rows longer than `max_length` from the tail.
    pub truncation: bool,

    /// The maximum row length, inclusive of special tokens.
    pub max_length: Option<usize>,

    /// The padding strategy.
    pub padding: PaddingStrategy,

    /// Reject inputs larger than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            add_special_tokens: true,
            truncation: true,
            max_length: Some(DEFAULT_MAX_LENGTH),
            padding: PaddingStrategy::DoNotPad,
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
        }
    }
}

impl EncodeOptions {
    /// Are rows framed with special tokens?
    pub fn add_special_tokens(&self) -> bool {
        self.add_special_tokens
    }

    /// Set whether rows are framed with special tokens.
    pub fn set_add_special_tokens(
        &mut self,
        add_special_tokens: bool,
    ) {
        self.add_special_tokens = add_special_tokens;
    }

    /// Set whether rows are framed with special tokens, and return the options.
    pub fn with_add_special_tokens(
        mut self,
        add_special_tokens: bool,
    ) -> Self {
        self.set_add_special_tokens(add_special_tokens);
        self
    }

    /// Is truncation enabled?
    pub fn truncation(&self) -> bool {
        self.truncation
    }

    /// Set whether truncation is enabled.
    pub fn set_truncation(
        &mut self,
        truncation: bool,
    ) {
        self.truncation = truncation;
    }

    /// Set whether truncation is enabled, and return the options.
    pub fn with_truncation(
        mut self,
        truncation: bool,
    ) -> Self {
        self.set_truncation(truncation);
        self
    }

    /// Get the maximum row length.
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Set the maximum row length.
    pub fn set_max_length<L>(
        &mut self,
        max_length: L,
    ) where
        L: Into<Option<usize>>,
    {
        self.max_length = max_length.into();
    }

    /// Set the maximum row length, and return the options.
    pub fn with_max_length<L>(
        mut self,
        max_length: L,
    ) -> Self
    where
        L: Into<Option<usize>>,
    {
        self.set_max_length(max_length);
        self
    }

    /// Get the padding strategy.
    pub fn padding(&self) -> PaddingStrategy {
        self.padding
    }

    /// Set the padding strategy.
    pub fn set_padding(
        &mut self,
        padding: PaddingStrategy,
    ) {
        self.padding = padding;
    }

    /// Set the padding strategy, and return the options.
    pub fn with_padding(
        mut self,
        padding: PaddingStrategy,
    ) -> Self {
        self.set_padding(padding);
        self
    }

    /// Get the per-input byte ceiling.
    pub fn max_input_bytes(&self) -> Option<usize> {
        self.max_input_bytes
    }

    /// Set the per-input byte ceiling.
    pub fn set_max_input_bytes<L>(
        &mut self,
        max_input_bytes: L,
    ) where
        L: Into<Option<usize>>,
    {
        self.max_input_bytes = max_input_bytes.into();
    }

    /// Set the per-input byte ceiling, and return the options.
    pub fn with_max_input_bytes<L>(
        mut self,
        max_input_bytes: L,
    ) -> Self
    where
        L: Into<Option<usize>>,
    {
        self.set_max_input_bytes(max_input_bytes);
        self
    }

    /// The number of special tokens framing each row.
    pub fn special_token_count(&self) -> usize {
        if self.add_special_tokens { 2 } else { 0 }
    }

    /// The content token budget per row, when truncating.
    pub fn content_budget(&self) -> Option<usize> {
        match (self.truncation, self.max_length) {
            (true, Some(max)) => Some(max.saturating_sub(self.special_token_count())),
            _ => None,
        }
    }

    /// Check the options for contradictions.
    ///
    /// ## Returns
    /// A [`PiecemealError::Configuration`] naming the first conflict found.
    pub fn validate(&self) -> PMResult<()> {
        if self.max_length == Some(0) {
            return Err(PiecemealError::config("max_length must be positive"));
        }
        if self.truncation && self.max_length.is_none() {
            return Err(PiecemealError::config("truncation requires max_length"));
        }
        if let Some(max) = self.max_length
            && self.truncation
            && max < self.special_token_count()
        {
            return Err(PiecemealError::config(format!(
                "max_length {max} cannot hold the {} special tokens",
                self.special_token_count()
            )));
        }
        if self.padding == PaddingStrategy::MaxLength {
            if self.max_length.is_none() {
                return Err(PiecemealError::config(
                    "max_length padding requires max_length",
                ));
            }
            if !self.truncation {
                return Err(PiecemealError::config(
                    "max_length padding requires truncation",
                ));
            }
        }
        if self.max_input_bytes == Some(0) {
            return Err(PiecemealError::config("max_input_bytes must be positive"));
        }
        Ok(())
    }

    /// Check the byte size of every input in a batch.
    ///
    /// ## Returns
    /// A [`PiecemealError::InputTooLarge`] for the first oversized input.
    pub fn check_input_sizes<S: AsRef<str>>(
        &self,
        batch: &[S],
    ) -> PMResult<()> {
        batch
            .iter()
            .enumerate()
            .try_for_each(|(index, text)| {
                check_input_size(index, text.as_ref(), self.max_input_bytes)
            })
    }
}

/// Check the byte size of one input.
///
/// ## Arguments
/// * `index` - the position of the input in its batch.
/// * `text` - the input.
/// * `limit` - the byte ceiling; `None` is unlimited.
///
/// ## Returns
/// A [`PiecemealError::InputTooLarge`] if `text` exceeds `limit`.
pub fn check_input_size(
    index: usize,
    text: &str,
    limit: Option<usize>,
) -> PMResult<()> {
    match limit {
        Some(limit) if text.len() > limit => Err(PiecemealError::InputTooLarge {
            index,
            size: text.len(),
            limit,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = EncodeOptions::default();
        assert!(opts.add_special_tokens());
        assert!(opts.truncation());
        assert_eq!(opts.max_length(), Some(512));
        assert_eq!(opts.padding(), PaddingStrategy::DoNotPad);
        assert_eq!(opts.max_input_bytes(), Some(1 << 20));
        assert_eq!(opts.content_budget(), Some(510));
        opts.validate().unwrap();
    }

    #[test]
    fn test_builders() {
        let opts = EncodeOptions::default()
            .with_add_special_tokens(false)
            .with_truncation(false)
            .with_max_length(None)
            .with_padding(PaddingStrategy::Longest)
            .with_max_input_bytes(10);
        assert!(!opts.add_special_tokens());
        assert_eq!(opts.special_token_count(), 0);
        assert_eq!(opts.content_budget(), None);
        assert_eq!(opts.max_input_bytes(), Some(10));
        opts.validate().unwrap();
    }

    #[test]
    fn test_validate_conflicts() {
        let bad = [
            EncodeOptions::default().with_max_length(0),
            EncodeOptions::default().with_max_length(None),
            EncodeOptions::default().with_max_length(1),
            EncodeOptions::default()
                .with_truncation(false)
                .with_padding(PaddingStrategy::MaxLength),
            EncodeOptions::default()
                .with_truncation(false)
                .with_max_length(None)
                .with_padding(PaddingStrategy::MaxLength),
            EncodeOptions::default().with_max_input_bytes(0),
        ];
        for opts in bad {
            assert!(
                matches!(opts.validate(), Err(PiecemealError::Configuration(_))),
                "{opts:?}"
            );
        }

        EncodeOptions::default()
            .with_add_special_tokens(false)
            .with_max_length(1)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_check_input_sizes() {
        let opts = EncodeOptions::default().with_max_input_bytes(3);
        opts.check_input_sizes(&["abc", ""]).unwrap();
        match opts.check_input_sizes(&["ab", "abcd"]) {
            Err(PiecemealError::InputTooLarge { index, size, limit }) => {
                assert_eq!((index, size, limit), (1, 4, 3));
            }
            other => panic!("unexpected: {other:?}"),
        }
        EncodeOptions::default()
            .with_max_input_bytes(None)
            .check_input_sizes(&["x".repeat(10)])
            .unwrap();

        check_input_size(0, "abcd", None).unwrap();
        assert!(matches!(
            check_input_size(5, "abcd", Some(2)),
            Err(PiecemealError::InputTooLarge { index: 5, size: 4, limit: 2 })
        ));
    }

    #[test]
    fn test_padding_names() {
        assert_eq!(
            "longest".parse::<PaddingStrategy>().unwrap(),
            PaddingStrategy::Longest
        );
        assert_eq!(
            "MAX_LENGTH".parse::<PaddingStrategy>().unwrap(),
            PaddingStrategy::MaxLength
        );
        assert_eq!(PaddingStrategy::DoNotPad.to_string(), "do_not_pad");
        assert_eq!(
            serde_json::to_string(&PaddingStrategy::MaxLength).unwrap(),
            "\"max_length\""
        );
    }

    #[test]
    fn test_serde_defaults() {
        let opts: EncodeOptions = serde_json::from_str(r#"{"max_length": 8}"#).unwrap();
        assert_eq!(opts, EncodeOptions::default().with_max_length(8));
    }
}
