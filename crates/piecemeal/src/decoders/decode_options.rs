//! # Decode Options

use serde::{Deserialize, Serialize};

/// Options for turning ids back into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Drop special and padding tokens from the output.
    pub skip_special_tokens: bool,

    /// Remove the spaces pre-tokenization put before punctuation and contractions.
    pub cleanup_tokenization_spaces: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            skip_special_tokens: true,
            cleanup_tokenization_spaces: true,
        }
    }
}

impl DecodeOptions {
    /// Are special tokens skipped?
    pub fn skip_special_tokens(&self) -> bool {
        self.skip_special_tokens
    }

    /// Set whether special tokens are skipped.
    pub fn set_skip_special_tokens(
        &mut self,
        skip_special_tokens: bool,
    ) {
        self.skip_special_tokens = skip_special_tokens;
    }

    /// Set whether special tokens are skipped, and return the options.
    pub fn with_skip_special_tokens(
        mut self,
        skip_special_tokens: bool,
    ) -> Self {
        self.set_skip_special_tokens(skip_special_tokens);
        self
    }

    /// Is tokenization space cleanup enabled?
    pub fn cleanup_tokenization_spaces(&self) -> bool {
        self.cleanup_tokenization_spaces
    }

    /// Set whether tokenization space cleanup is enabled.
    pub fn set_cleanup_tokenization_spaces(
        &mut self,
        cleanup_tokenization_spaces: bool,
    ) {
        self.cleanup_tokenization_spaces = cleanup_tokenization_spaces;
    }

    /// Set whether tokenization space cleanup is enabled, and return the options.
    pub fn with_cleanup_tokenization_spaces(
        mut self,
        cleanup_tokenization_spaces: bool,
    ) -> Self {
        self.set_cleanup_tokenization_spaces(cleanup_tokenization_spaces);
        self
    }
}
