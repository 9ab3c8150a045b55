//! # Token Encoder Trait

use std::sync::Arc;

use crate::{
    PMResult,
    TokenType,
    encoders::{
        DEFAULT_MAX_INPUT_BYTES,
        EncodeOptions,
        EncodedBatch,
        EncodedExample,
        check_input_size,
        post_process::{pad_rows, truncate_and_frame},
        windows::{WindowOptions, split_windows},
    },
    vocab::TokenizerVocab,
};

/// Rough bytes of input per token, for buffer sizing.
pub const EXPECTED_BYTES_PER_TOKEN: f32 = 4.0;

/// A trait for token encoders.
///
/// Implementors provide [`TokenEncoder::try_encode_append`], which emits
/// the raw content tokens of one text; framing, truncation and padding
/// are layered on by the provided batch methods.
///
/// Every public entry point checks input byte sizes before encoding;
/// the `_unchecked` methods are the seams wrapping encoders override.
pub trait TokenEncoder<T: TokenType>: Send + Sync {
    /// Return the attached vocabulary.
    fn vocab(&self) -> &Arc<TokenizerVocab<T>>;

    /// Encode text, appending content tokens to a target row.
    ///
    /// ## Arguments
    /// * `text` - The text to encode.
    /// * `row` - The target row to append to.
    fn try_encode_append(
        &self,
        text: &str,
        row: &mut EncodedExample<T>,
    ) -> PMResult<()>;

    /// Encode text into its raw content tokens, without a size check.
    ///
    /// Wrapping encoders override this, and the batch paths call it
    /// after checking input sizes against their own options.
    ///
    /// ## Arguments
    /// * `text` - The text to encode.
    ///
    /// ## Returns
    /// The shared, immutable content encoding.
    fn try_encode_unchecked(
        &self,
        text: &str,
    ) -> PMResult<Arc<EncodedExample<T>>> {
        let capacity = text.len() as f32 / EXPECTED_BYTES_PER_TOKEN;
        let mut row = EncodedExample::with_capacity(capacity as usize);
        self.try_encode_append(text, &mut row)?;
        Ok(Arc::new(row))
    }

    /// Encode text into its raw content tokens, without special tokens.
    ///
    /// ## Arguments
    /// * `text` - The text to encode.
    ///
    /// ## Returns
    /// The shared, immutable content encoding; or
    /// [`PiecemealError::InputTooLarge`](crate::PiecemealError::InputTooLarge)
    /// if `text` exceeds [`DEFAULT_MAX_INPUT_BYTES`].
    fn try_encode(
        &self,
        text: &str,
    ) -> PMResult<Arc<EncodedExample<T>>> {
        check_input_size(0, text, Some(DEFAULT_MAX_INPUT_BYTES))?;
        self.try_encode_unchecked(text)
    }

    /// Encode a batch of texts into raw content encodings, without a size check.
    ///
    /// ## Arguments
    /// * `batch` - The texts to encode.
    ///
    /// ## Returns
    /// One content encoding per text, in input order.
    fn try_encode_examples_unchecked(
        &self,
        batch: &[String],
    ) -> PMResult<Vec<Arc<EncodedExample<T>>>> {
        batch
            .iter()
            .map(|text| self.try_encode_unchecked(text))
            .collect()
    }

    /// Encode a batch of texts into raw content encodings.
    ///
    /// ## Arguments
    /// * `batch` - The texts to encode.
    ///
    /// ## Returns
    /// One content encoding per text, in input order; or
    /// [`PiecemealError::InputTooLarge`](crate::PiecemealError::InputTooLarge)
    /// for the first text over [`DEFAULT_MAX_INPUT_BYTES`].
    fn try_encode_examples(
        &self,
        batch: &[String],
    ) -> PMResult<Vec<Arc<EncodedExample<T>>>> {
        EncodeOptions::default().check_input_sizes(batch)?;
        self.try_encode_examples_unchecked(batch)
    }

    /// Encode a batch of texts into model rows.
    ///
    /// ## Arguments
    /// * `batch` - The texts to encode.
    /// * `options` - framing, truncation, padding, and size limits.
    ///
    /// ## Returns
    /// An [`EncodedBatch`] with one row per text, in input order; or the
    /// first configuration or input-size error. No partial batch is returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, batch, options), fields(batch_size = batch.len()))
    )]
    fn try_encode_batch(
        &self,
        batch: &[String],
        options: &EncodeOptions,
    ) -> PMResult<EncodedBatch<T>> {
        options.validate()?;
        options.check_input_sizes(batch)?;

        let specials = self.vocab().specials();
        let mut rows: Vec<EncodedExample<T>> = self
            .try_encode_examples_unchecked(batch)?
            .iter()
            .map(|content| truncate_and_frame(specials, content, options))
            .collect();
        pad_rows(&mut rows, options, specials.padding_id());

        Ok(EncodedBatch::from(rows))
    }

    /// Encode one text into overlapping framed windows.
    ///
    /// ## Arguments
    /// * `text` - The text to encode.
    /// * `options` - the window length and stride.
    ///
    /// ## Returns
    /// At least one window; consecutive windows share `stride` content tokens.
    fn try_encode_windows(
        &self,
        text: &str,
        options: &WindowOptions,
    ) -> PMResult<Vec<EncodedExample<T>>> {
        options.content_budget()?;
        check_input_size(0, text, options.max_input_bytes)?;
        let content = self.try_encode_unchecked(text)?;
        split_windows(self.vocab().specials(), &content, options)
    }
}
