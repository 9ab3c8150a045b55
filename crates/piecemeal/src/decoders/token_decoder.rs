//! # Token Decoder Trait

use crate::{
    PMResult,
    TokenType,
    decoders::{BatchDecodeResult, DecodeResult},
};

/// Trait for token decoders.
pub trait TokenDecoder<T: TokenType>: Send + Sync {
    /// Decodes tokens into a string.
    ///
    /// ## Arguments
    /// * `tokens` - A slice of tokens to decode.
    ///
    /// ## Returns
    /// The decoded text; `remaining` counts the tokens from the first
    /// id the decoder could not resolve.
    fn try_decode_to_string(
        &self,
        tokens: &[T],
    ) -> PMResult<DecodeResult<String>>;

    /// Decodes a batch of token sequences.
    ///
    /// ## Arguments
    /// * `batch` - A batch of tokens.
    ///
    /// ## Returns
    /// One result per sequence, in order.
    fn try_decode_batch_to_strings(
        &self,
        batch: &[&[T]],
    ) -> PMResult<BatchDecodeResult<String>> {
        batch
            .iter()
            .map(|tokens| self.try_decode_to_string(tokens))
            .collect::<PMResult<Vec<_>>>()
            .map(BatchDecodeResult::from)
    }
}
