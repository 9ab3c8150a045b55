//! # Piece Encoder
//!
//! The per-example pipeline:
//! raw text -> added-token split -> normalize -> pre-tokenize -> segment.

use core::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    PMResult,
    TokenType,
    concurrency::PoolToy,
    encoders::{EncodedExample, TokenEncoder},
    normalize::{Normalizer, TextSegment, pretokenize},
    segmenters::{
        Piece,
        SegmenterBuilder,
        SegmenterSelector,
        SpanSegmenter,
        model_segmenter_builder,
    },
    vocab::TokenizerVocab,
};

struct SegmenterSlot<T: TokenType> {
    segmenter: Box<dyn SpanSegmenter<T>>,
    pieces: Vec<Piece<T>>,
}

/// A [`TokenEncoder`] that composes the [`Normalizer`], the pre-tokenizer,
/// and a [`SpanSegmenter`].
///
/// Segmenters keep scratch buffers, so each thread borrows one from a
/// small pool rather than sharing a single instance.
pub struct PieceEncoder<T: TokenType> {
    vocab: Arc<TokenizerVocab<T>>,
    normalizer: Normalizer,
    pool: PoolToy<Mutex<SegmenterSlot<T>>>,
}

impl<T: TokenType> core::fmt::Debug for PieceEncoder<T> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("PieceEncoder")
            .field("model", self.vocab.model())
            .field("normalizer", self.normalizer.config())
            .field("pool", &self.pool)
            .finish()
    }
}

impl<T: TokenType> PieceEncoder<T> {
    /// Create an encoder using the vocabulary's model.
    pub fn new(vocab: Arc<TokenizerVocab<T>>) -> Self {
        let builder = model_segmenter_builder(vocab.model());
        Self::new_with_builder(vocab, builder, None)
    }

    /// Create an encoder using the selected [`SpanSegmenter`].
    ///
    /// ## Returns
    /// The encoder; or a [`PiecemealError::Configuration`](crate::PiecemealError::Configuration)
    /// if the selector contradicts the vocabulary's model.
    pub fn new_with_selector(
        vocab: Arc<TokenizerVocab<T>>,
        selector: SegmenterSelector,
    ) -> PMResult<Self> {
        let builder = selector.segmenter_builder(vocab.model())?;
        Ok(Self::new_with_builder(vocab, builder, None))
    }

    /// Create an encoder.
    ///
    /// ## Arguments
    /// * `vocab` - The reference vocabulary.
    /// * `builder` - builds one segmenter per pool slot.
    /// * `max_pool` - override the segmenter pool size.
    pub fn new_with_builder(
        vocab: Arc<TokenizerVocab<T>>,
        builder: SegmenterBuilder<T>,
        max_pool: Option<NonZeroUsize>,
    ) -> Self {
        let normalizer = Normalizer::new(*vocab.normalizer_config());
        let pool = PoolToy::from_fn(max_pool, || {
            Mutex::new(SegmenterSlot {
                segmenter: builder(),
                pieces: Vec::new(),
            })
        });
        Self {
            vocab,
            normalizer,
            pool,
        }
    }

    /// The normalizer in use.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

impl<T: TokenType> TokenEncoder<T> for PieceEncoder<T> {
    fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        &self.vocab
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, text, row))
    )]
    fn try_encode_append(
        &self,
        text: &str,
        row: &mut EncodedExample<T>,
    ) -> PMResult<()> {
        let mut slot = self.pool.get().lock();
        let SegmenterSlot { segmenter, pieces } = &mut *slot;

        for segment in self.vocab.added_tokens().split(text) {
            let range = match segment {
                TextSegment::Added { range, id } => {
                    row.push_token(id, range);
                    continue;
                }
                TextSegment::Text(range) => range,
            };

            let normalized = self
                .normalizer
                .normalize(&text[range.clone()], range.start);
            for word in pretokenize(&normalized) {
                pieces.clear();
                segmenter.segment_append(&self.vocab, word.text(&normalized), pieces);

                let base = word.normalized.start;
                for (idx, piece) in pieces.iter().enumerate() {
                    let span = base + piece.range.start..base + piece.range.end;
                    row.push_piece(piece.token, normalized.original_range(span), idx == 0);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoders::{EncodeOptions, testing::common_encoder_tests},
        normalize::{AddedToken, NormalizerConfig},
        vocab::{
            ModelConfig,
            SpecialTokenNames,
            WordVocab,
            testing::{build_test_bpe_vocab, build_test_wordpiece_vocab},
        },
    };

    fn wordpiece() -> PieceEncoder<u32> {
        PieceEncoder::new(Arc::new(build_test_wordpiece_vocab()))
    }

    fn ids(
        encoder: &PieceEncoder<u32>,
        text: &str,
    ) -> Vec<u32> {
        encoder.try_encode(text).unwrap().ids.clone()
    }

    #[test]
    fn test_common() {
        common_encoder_tests(&wordpiece());
        common_encoder_tests(&PieceEncoder::<u32>::new(Arc::new(build_test_bpe_vocab())));
    }

    #[test]
    fn test_known_sequences() {
        let enc = wordpiece();
        let batch = enc
            .try_encode_batch(
                &["playing".to_string(), "xyz".to_string()],
                &EncodeOptions::default(),
            )
            .unwrap();
        assert_eq!(batch.rows[0].ids, vec![2, 4, 5, 3]);
        assert_eq!(batch.rows[1].ids, vec![2, 0, 3]);
    }

    #[test]
    fn test_normalized_offsets() {
        let enc = wordpiece();
        let text = "  The CAT, played!";
        let row = enc.try_encode(text).unwrap();

        let pieces: Vec<&str> = row.offsets.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(pieces, vec!["The", "CAT", ",", "play", "ed", "!"]);
        assert_eq!(row.ids, vec![7, 8, 15, 4, 6, 16]);
        assert!(row.special_tokens_mask.iter().all(|&m| m == 0));
    }

    #[test]
    fn test_accents_map_to_original_bytes() {
        let vocab = crate::vocab::testing::build_wordpiece_vocab::<u32>(
            &["[UNK]", "[PAD]", "[CLS]", "[SEP]", "cafe"],
            NormalizerConfig::bert_uncased(),
        )
        .unwrap();
        let enc = PieceEncoder::new(Arc::new(vocab));
        let text = "Caf\u{e9}";
        let row = enc.try_encode(text).unwrap();
        assert_eq!(row.ids, vec![4]);
        assert_eq!(row.offsets, vec![0..text.len()]);
    }

    #[test]
    fn test_added_tokens_bypass_normalization() {
        let words = WordVocab::from_tokens([
            "[UNK]", "[PAD]", "[CLS]", "[SEP]", "[MASK]", "hello", "<Custom>",
        ])
        .unwrap();
        let vocab = TokenizerVocab::new(
            ModelConfig::default(),
            words,
            &[],
            SpecialTokenNames::bert().with_mask(Some("[MASK]")),
            vec![AddedToken {
                content: "<Custom>".to_string(),
                id: 6u32,
                normalized: false,
            }],
            NormalizerConfig::bert_uncased(),
        )
        .unwrap();
        let enc = PieceEncoder::new(Arc::new(vocab));

        let text = "hello[MASK]<Custom> HELLO";
        let row = enc.try_encode(text).unwrap();
        assert_eq!(row.ids, vec![5, 4, 6, 5]);
        assert_eq!(row.offsets, vec![0..5, 5..11, 11..19, 20..25]);
    }

    #[test]
    fn test_cjk_isolated() {
        let vocab = crate::vocab::testing::build_wordpiece_vocab::<u32>(
            &["[UNK]", "[PAD]", "[CLS]", "[SEP]", "中", "国", "a"],
            NormalizerConfig::bert_uncased(),
        )
        .unwrap();
        let enc = PieceEncoder::new(Arc::new(vocab));
        let text = "a中国";
        let row = enc.try_encode(text).unwrap();
        assert_eq!(row.ids, vec![6, 4, 5]);
        assert_eq!(row.offsets, vec![0..1, 1..4, 4..7]);
    }

    #[test]
    fn test_unknown_word_spans_whole_word() {
        let enc = wordpiece();
        let row = enc.try_encode("the qqq").unwrap();
        assert_eq!(row.ids, vec![7, 0]);
        assert_eq!(row.offsets, vec![0..3, 4..7]);
        assert!(ids(&enc, "").is_empty());
        assert!(ids(&enc, " \t\n").is_empty());
    }

    #[test]
    fn test_bpe_pipeline() {
        let enc = PieceEncoder::<u32>::new(Arc::new(build_test_bpe_vocab()));
        let vocab = enc.vocab().clone();
        let row = enc.try_encode("lower new lows").unwrap();
        let tokens: Vec<&str> = row
            .ids
            .iter()
            .map(|&id| vocab.id_to_token(id).unwrap())
            .collect();
        assert_eq!(tokens, vec!["lower", "new", "low", "s"]);
        assert_eq!(row.offsets, vec![0..5, 6..9, 10..13, 13..14]);
    }

    #[test]
    fn test_selector_must_match_model() {
        let bpe = Arc::new(build_test_bpe_vocab::<u32>());
        assert!(matches!(
            PieceEncoder::new_with_selector(bpe.clone(), SegmenterSelector::WordPiece),
            Err(crate::PiecemealError::Configuration(_))
        ));
        let enc = PieceEncoder::new_with_selector(bpe, SegmenterSelector::Bpe).unwrap();
        assert_eq!(ids(&enc, "low"), vec![13]);
    }

    #[test]
    fn test_pool_size() {
        let vocab = Arc::new(build_test_wordpiece_vocab::<u32>());
        let builder = model_segmenter_builder(vocab.model());
        let enc = PieceEncoder::new_with_builder(vocab, builder, NonZeroUsize::new(1));
        assert_eq!(ids(&enc, "playing"), vec![4, 5]);
        assert!(format!("{enc:?}").contains("PoolToy"));
    }
}
