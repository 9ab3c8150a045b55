//! # Parallel Encoder

use std::sync::Arc;

use crate::{
    PMResult,
    TokenType,
    encoders::{EncodedExample, TokenEncoder},
    vocab::TokenizerVocab,
};

/// Batch-Level Parallel Encoder Wrapper.
///
/// Shards the rows of a batch across the ``rayon`` pool; row `i` of the
/// output always encodes input `i`.
pub struct ParallelRayonEncoder<T: TokenType> {
    /// Inner encoder.
    pub inner: Arc<dyn TokenEncoder<T>>,

    _marker: std::marker::PhantomData<T>,
}

impl<T> ParallelRayonEncoder<T>
where
    T: TokenType,
{
    /// Create a new parallel encoder.
    ///
    /// ## Arguments
    /// * `inner` - The token encoder to wrap.
    pub fn new(inner: Arc<dyn TokenEncoder<T>>) -> Self {
        Self {
            inner,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> TokenEncoder<T> for ParallelRayonEncoder<T>
where
    T: TokenType,
{
    fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        self.inner.vocab()
    }

    fn try_encode_append(
        &self,
        text: &str,
        row: &mut EncodedExample<T>,
    ) -> PMResult<()> {
        self.inner.try_encode_append(text, row)
    }

    fn try_encode_unchecked(
        &self,
        text: &str,
    ) -> PMResult<Arc<EncodedExample<T>>> {
        self.inner.try_encode_unchecked(text)
    }

    fn try_encode_examples_unchecked(
        &self,
        batch: &[String],
    ) -> PMResult<Vec<Arc<EncodedExample<T>>>> {
        use rayon::prelude::*;

        batch
            .par_iter()
            .map(|text| self.inner.try_encode_unchecked(text))
            .collect()
    }
}
