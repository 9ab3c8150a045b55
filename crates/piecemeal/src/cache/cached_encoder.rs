//! # Cached Encoder

use std::sync::Arc;

use crate::{
    PMResult,
    TokenType,
    cache::{CacheOptions, EncodeCache},
    encoders::{EncodedExample, TokenEncoder},
    vocab::TokenizerVocab,
};

/// A [`TokenEncoder`] wrapper that memoizes content encodings by text.
///
/// Content encodings do not depend on [`EncodeOptions`](crate::encoders::EncodeOptions),
/// so one cache serves every option set; a miss falls through to the
/// inner encoder.
pub struct CachedEncoder<T: TokenType> {
    /// Inner encoder.
    pub inner: Arc<dyn TokenEncoder<T>>,

    cache: EncodeCache<T>,
}

impl<T: TokenType> CachedEncoder<T> {
    /// Wrap an encoder with a new cache.
    pub fn new(
        inner: Arc<dyn TokenEncoder<T>>,
        options: CacheOptions,
    ) -> Self {
        Self {
            inner,
            cache: EncodeCache::new(options),
        }
    }

    /// The attached cache.
    pub fn cache(&self) -> &EncodeCache<T> {
        &self.cache
    }
}

impl<T: TokenType> TokenEncoder<T> for CachedEncoder<T> {
    fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        self.inner.vocab()
    }

    fn try_encode_append(
        &self,
        text: &str,
        row: &mut EncodedExample<T>,
    ) -> PMResult<()> {
        let content = self.try_encode_unchecked(text)?;
        row.extend_from(&content, 0..content.len());
        Ok(())
    }

    fn try_encode_unchecked(
        &self,
        text: &str,
    ) -> PMResult<Arc<EncodedExample<T>>> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit);
        }
        let content = self.inner.try_encode_unchecked(text)?;
        self.cache.insert(text, content.clone());
        Ok(content)
    }
}
