//! # Piece Decoder
//!
//! Rebuilds text from subword ids:
//! * continuation pieces (carrying the continuation prefix) are glued to
//!   the previous piece; other pieces start a new space-separated word,
//! * with an end-of-word suffix (BPE), the suffix becomes the word break,
//! * tokenization-space cleanup then removes the spaces that pre-tokenization
//!   put before punctuation and contractions.
//!
//! Normalization is lossy, so decoding recovers the normalized text, not
//! the original input.

use std::sync::Arc;

use crate::{
    PMResult,
    TokenType,
    decoders::{DecodeOptions, DecodeResult, TokenDecoder},
    vocab::TokenizerVocab,
};

/// Replacements applied by tokenization-space cleanup, in order.
const CLEANUP_REPLACEMENTS: &[(&str, &str)] = &[
    (" .", "."),
    (" ?", "?"),
    (" !", "!"),
    (" ,", ","),
    (" ' ", "'"),
    (" n't", "n't"),
    (" 'm", "'m"),
    (" 's", "'s"),
    (" 've", "'ve"),
    (" 're", "'re"),
];

/// Remove the spaces pre-tokenization put before punctuation and contractions.
pub fn cleanup_tokenization_spaces(text: &str) -> String {
    CLEANUP_REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// A [`TokenDecoder`] over a [`TokenizerVocab`].
#[derive(Debug, Clone)]
pub struct PieceDecoder<T: TokenType> {
    vocab: Arc<TokenizerVocab<T>>,
    options: DecodeOptions,
}

impl<T: TokenType> PieceDecoder<T> {
    /// Create a decoder with default options.
    pub fn new(vocab: Arc<TokenizerVocab<T>>) -> Self {
        Self::new_with_options(vocab, DecodeOptions::default())
    }

    /// Create a decoder.
    pub fn new_with_options(
        vocab: Arc<TokenizerVocab<T>>,
        options: DecodeOptions,
    ) -> Self {
        Self { vocab, options }
    }

    /// The attached vocabulary.
    pub fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        &self.vocab
    }

    /// The decode options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }
}

impl<T: TokenType> TokenDecoder<T> for PieceDecoder<T> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, tokens))
    )]
    fn try_decode_to_string(
        &self,
        tokens: &[T],
    ) -> PMResult<DecodeResult<String>> {
        let model = self.vocab.model();
        let prefix = model.continuing_subword_prefix();
        let suffix = model.end_of_word_suffix();
        let specials = self.vocab.specials();

        let mut text = String::new();
        let mut first = true;
        for (idx, &id) in tokens.iter().enumerate() {
            let Some(token) = self.vocab.id_to_token(id) else {
                return Ok(DecodeResult::new(
                    self.finish(text, suffix.is_some()),
                    Some(tokens.len() - idx),
                ));
            };
            if self.options.skip_special_tokens && specials.is_special(id) {
                continue;
            }

            let (body, continues) = match prefix.and_then(|p| token.strip_prefix(p)) {
                Some(rest) if !first => (rest, true),
                _ => (token, false),
            };

            match suffix {
                Some(suffix) => match body.strip_suffix(suffix) {
                    Some(word) => {
                        text.push_str(word);
                        text.push(' ');
                    }
                    None => text.push_str(body),
                },
                None => {
                    if !first && !continues {
                        text.push(' ');
                    }
                    text.push_str(body);
                }
            }
            first = false;
        }

        Ok(DecodeResult::new(self.finish(text, suffix.is_some()), None))
    }
}

impl<T: TokenType> PieceDecoder<T> {
    fn finish(
        &self,
        mut text: String,
        trim_end: bool,
    ) -> String {
        if trim_end {
            text.truncate(text.trim_end_matches(' ').len());
        }
        if self.options.cleanup_tokenization_spaces {
            cleanup_tokenization_spaces(&text)
        } else {
            text
        }
    }
}
