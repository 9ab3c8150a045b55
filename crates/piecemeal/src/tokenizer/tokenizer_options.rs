//! # Tokenizer Options
//!
//! Options for building a [`Tokenizer`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    TokenType,
    cache::{CacheOptions, CachedEncoder},
    decoders::{DecodeOptions, PieceDecoder, TokenDecoder},
    encoders::{PieceEncoder, TokenEncoder},
    segmenters::{SegmenterBuilder, SegmenterSelector},
    tokenizer::Tokenizer,
    vocab::TokenizerVocab,
};

/// Options for configuring a [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerOptions {
    /// Should batches be sharded across threads?
    ///
    /// Requires the `rayon` feature; ignored without it.
    pub parallel: bool,

    /// Front the encoder with an LRU cache, when set.
    pub cache: Option<CacheOptions>,

    /// The segmenter policy.
    pub segmenter: SegmenterSelector,

    /// Decoder options.
    pub decoder: DecodeOptions,
}

impl TokenizerOptions {
    /// Gets the configured parallelism value.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Sets the configured parallelism value.
    pub fn set_parallel(
        &mut self,
        parallel: bool,
    ) {
        self.parallel = parallel;
    }

    /// Sets the configured parallelism value, and return the options.
    pub fn with_parallel(
        mut self,
        parallel: bool,
    ) -> Self {
        self.set_parallel(parallel);
        self
    }

    /// Gets the cache options.
    pub fn cache(&self) -> Option<CacheOptions> {
        self.cache
    }

    /// Sets the cache options.
    pub fn set_cache<C>(
        &mut self,
        cache: C,
    ) where
        C: Into<Option<CacheOptions>>,
    {
        self.cache = cache.into();
    }

    /// Sets the cache options, and return the options.
    pub fn with_cache<C>(
        mut self,
        cache: C,
    ) -> Self
    where
        C: Into<Option<CacheOptions>>,
    {
        self.set_cache(cache);
        self
    }

    /// Gets the segmenter policy.
    pub fn segmenter(&self) -> SegmenterSelector {
        self.segmenter
    }

    /// Sets the segmenter policy, and return the options.
    pub fn with_segmenter(
        mut self,
        segmenter: SegmenterSelector,
    ) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Gets the decoder options.
    pub fn decoder(&self) -> DecodeOptions {
        self.decoder
    }

    /// Sets the decoder options, and return the options.
    pub fn with_decoder(
        mut self,
        decoder: DecodeOptions,
    ) -> Self {
        self.decoder = decoder;
        self
    }

    /// Build a [`Tokenizer`] for the given vocab.
    ///
    /// Encoder layering, innermost first:
    /// [`PieceEncoder`], then [`CachedEncoder`], then batch parallelism.
    ///
    /// ## Returns
    /// The tokenizer; or a [`PiecemealError::Configuration`](crate::PiecemealError::Configuration)
    /// if the segmenter policy contradicts the vocabulary's model.
    pub fn build<T: TokenType>(
        &self,
        vocab: Arc<TokenizerVocab<T>>,
    ) -> PMResult<Arc<Tokenizer<T>>> {
        let segmenter = self.segmenter.resolve(vocab.model())?;
        let builder = self.segmenter.segmenter_builder(vocab.model())?;
        log::debug!(
            "tokenizer: segmenter={segmenter}, cache={}, parallel={}",
            self.cache.is_some(),
            self.parallel
        );
        Ok(self.build_with_builder(vocab, builder))
    }

    /// Build a [`Tokenizer`] around an explicit segmenter builder.
    pub fn build_with_builder<T: TokenType>(
        &self,
        vocab: Arc<TokenizerVocab<T>>,
        builder: SegmenterBuilder<T>,
    ) -> Arc<Tokenizer<T>> {
        let mut enc: Arc<dyn TokenEncoder<T>> =
            Arc::new(PieceEncoder::new_with_builder(vocab.clone(), builder, None));

        if let Some(cache) = self.cache {
            enc = Arc::new(CachedEncoder::new(enc, cache));
        }

        #[cfg(feature = "rayon")]
        if self.parallel {
            use crate::concurrency::ParallelRayonEncoder;
            enc = Arc::new(ParallelRayonEncoder::new(enc));
        }

        let dec: Arc<dyn TokenDecoder<T>> =
            Arc::new(PieceDecoder::new_with_options(vocab.clone(), self.decoder));

        Tokenizer::new(vocab, enc, dec).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoders::{EncodeOptions, testing::common_encoder_tests},
        vocab::testing::build_test_wordpiece_vocab,
    };

    #[test]
    fn test_accessors() {
        let opts = TokenizerOptions::default();
        assert!(!opts.parallel());
        assert!(opts.cache().is_none());
        assert_eq!(opts.segmenter(), SegmenterSelector::Model);

        let opts = opts
            .with_parallel(true)
            .with_cache(CacheOptions::default())
            .with_segmenter(SegmenterSelector::WordPiece)
            .with_decoder(DecodeOptions::default().with_skip_special_tokens(false));
        assert!(opts.parallel());
        assert!(opts.cache().is_some());
        assert!(!opts.decoder().skip_special_tokens());
    }

    #[test]
    fn test_serde() {
        let opts: TokenizerOptions =
            serde_json::from_str(r#"{"parallel": true, "segmenter": "word-piece"}"#).unwrap();
        assert!(opts.parallel());
        assert_eq!(opts.segmenter(), SegmenterSelector::WordPiece);

        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(serde_json::from_str::<TokenizerOptions>(&json).unwrap(), opts);
    }

    #[test]
    fn test_build_all_layers() {
        let vocab = Arc::new(build_test_wordpiece_vocab::<u32>());
        let expected = TokenizerOptions::default()
            .build(vocab.clone())
            .unwrap()
            .try_encode_batch(&["the cat".to_string()], &EncodeOptions::default())
            .unwrap();

        for parallel in [false, true] {
            for cache in [None, Some(CacheOptions::default())] {
                let tok = TokenizerOptions::default()
                    .with_parallel(parallel)
                    .with_cache(cache)
                    .build(vocab.clone())
                    .unwrap();
                common_encoder_tests(tok.as_ref());
                assert_eq!(
                    tok.try_encode_batch(&["the cat".to_string()], &EncodeOptions::default())
                        .unwrap(),
                    expected
                );
            }
        }
    }

    #[test]
    fn test_build_rejects_mismatched_segmenter() {
        let vocab = Arc::new(build_test_wordpiece_vocab::<u32>());
        let err = TokenizerOptions::default()
            .with_segmenter(SegmenterSelector::Bpe)
            .build(vocab.clone())
            .unwrap_err();
        assert!(matches!(err, crate::PiecemealError::Configuration(_)));

        let tok = TokenizerOptions::default()
            .with_segmenter(SegmenterSelector::WordPiece)
            .build(vocab)
            .unwrap();
        assert_eq!(tok.try_encode("playing").unwrap().ids, vec![4, 5]);
    }
}
