//! # Combined Tokenizer

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    TokenType,
    decoders::{BatchDecodeResult, DecodeResult, TokenDecoder},
    encoders::{
        EncodeOptions,
        EncodedBatch,
        EncodedExample,
        KeyedBatchOptions,
        KeyedBatches,
        TokenEncoder,
        WindowOptions,
        keyed_batches,
    },
    segmenters::model_segmenter_builder,
    tokenizer::TokenizerOptions,
    vocab::TokenizerVocab,
};

/// Text to encode: one string, or a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    /// A single text.
    Single(String),

    /// A batch of texts.
    Batch(Vec<String>),
}

impl TextInput {
    /// Is this a single text?
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// The number of texts.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(batch) => batch.len(),
        }
    }

    /// Is this an empty batch?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The texts, as a slice.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(text) => core::slice::from_ref(text),
            Self::Batch(batch) => batch,
        }
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(batch: Vec<String>) -> Self {
        Self::Batch(batch)
    }
}

/// Unified Tokenizer.
///
/// Combines:
///  * [`TokenizerVocab`],
///  * [`TokenEncoder`], and
///  * [`TokenDecoder`] wrappers.
///
/// Handles are cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Tokenizer<T: TokenType> {
    vocab: Arc<TokenizerVocab<T>>,
    encoder: Arc<dyn TokenEncoder<T>>,
    decoder: Arc<dyn TokenDecoder<T>>,
}

impl<T: TokenType> core::fmt::Debug for Tokenizer<T> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("model", self.vocab.model())
            .field("vocab_size", &self.vocab.len())
            .finish()
    }
}

impl<T: TokenType> Tokenizer<T> {
    /// Create a new tokenizer.
    pub fn new(
        vocab: Arc<TokenizerVocab<T>>,
        encoder: Arc<dyn TokenEncoder<T>>,
        decoder: Arc<dyn TokenDecoder<T>>,
    ) -> Self {
        Self {
            vocab,
            encoder,
            decoder,
        }
    }

    /// Build a tokenizer with default options.
    pub fn from_vocab(vocab: Arc<TokenizerVocab<T>>) -> Arc<Self> {
        let builder = model_segmenter_builder(vocab.model());
        TokenizerOptions::default().build_with_builder(vocab, builder)
    }

    /// Get the underlying vocabulary.
    pub fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        &self.vocab
    }

    /// Get the underlying encoder.
    pub fn encoder(&self) -> &Arc<dyn TokenEncoder<T>> {
        &self.encoder
    }

    /// Get the underlying decoder.
    pub fn decoder(&self) -> &Arc<dyn TokenDecoder<T>> {
        &self.decoder
    }

    /// Encode a [`TextInput`].
    ///
    /// A single text yields a one-row batch.
    pub fn encode_input(
        &self,
        input: &TextInput,
        options: &EncodeOptions,
    ) -> PMResult<EncodedBatch<T>> {
        self.encoder.try_encode_batch(input.as_slice(), options)
    }

    /// Batch keyed documents into fixed-shape rows.
    ///
    /// See [`keyed_batches`].
    pub fn keyed_batches<K, I>(
        &self,
        source: I,
        options: KeyedBatchOptions,
    ) -> PMResult<KeyedBatches<'_, K, T, Self, I::IntoIter>>
    where
        K: Clone,
        I: IntoIterator<Item = (K, String)>,
    {
        keyed_batches(self, source, options)
    }
}

impl<T: TokenType> TokenEncoder<T> for Tokenizer<T> {
    fn vocab(&self) -> &Arc<TokenizerVocab<T>> {
        &self.vocab
    }

    fn try_encode_append(
        &self,
        text: &str,
        row: &mut EncodedExample<T>,
    ) -> PMResult<()> {
        self.encoder.try_encode_append(text, row)
    }

    fn try_encode_unchecked(
        &self,
        text: &str,
    ) -> PMResult<Arc<EncodedExample<T>>> {
        self.encoder.try_encode_unchecked(text)
    }

    fn try_encode_examples_unchecked(
        &self,
        batch: &[String],
    ) -> PMResult<Vec<Arc<EncodedExample<T>>>> {
        self.encoder.try_encode_examples_unchecked(batch)
    }

    fn try_encode_batch(
        &self,
        batch: &[String],
        options: &EncodeOptions,
    ) -> PMResult<EncodedBatch<T>> {
        self.encoder.try_encode_batch(batch, options)
    }

    fn try_encode_windows(
        &self,
        text: &str,
        options: &WindowOptions,
    ) -> PMResult<Vec<EncodedExample<T>>> {
        self.encoder.try_encode_windows(text, options)
    }
}

impl<T: TokenType> TokenDecoder<T> for Tokenizer<T> {
    fn try_decode_to_string(
        &self,
        tokens: &[T],
    ) -> PMResult<DecodeResult<String>> {
        self.decoder.try_decode_to_string(tokens)
    }

    fn try_decode_batch_to_strings(
        &self,
        batch: &[&[T]],
    ) -> PMResult<BatchDecodeResult<String>> {
        self.decoder.try_decode_batch_to_strings(batch)
    }
}

/// Encode a batch against a vocabulary, with a default [`Tokenizer`].
///
/// ## Arguments
/// * `vocab` - the shared vocabulary.
/// * `texts` - the texts to encode.
/// * `options` - framing, truncation, padding, and size limits.
///
/// ## Returns
/// One row per text, in input order.
pub fn encode_batch<T: TokenType>(
    vocab: Arc<TokenizerVocab<T>>,
    texts: &[String],
    options: &EncodeOptions,
) -> PMResult<EncodedBatch<T>> {
    Tokenizer::from_vocab(vocab).try_encode_batch(texts, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        PiecemealError,
        encoders::{DEFAULT_MAX_INPUT_BYTES, PaddingStrategy, testing::common_encoder_tests},
        vocab::testing::build_test_wordpiece_vocab,
    };

    fn tokenizer() -> Arc<Tokenizer<u32>> {
        Tokenizer::from_vocab(Arc::new(build_test_wordpiece_vocab()))
    }

    #[test]
    fn test_common() {
        common_encoder_tests(tokenizer().as_ref());
    }

    #[test]
    fn test_text_input_serde() {
        let single: TextInput = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(single, TextInput::from("hello"));
        assert!(single.is_single());
        assert_eq!(single.len(), 1);

        let batch: TextInput = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(batch, TextInput::from(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(batch.as_slice().len(), 2);

        let empty: TextInput = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_encode_input() {
        let tok = tokenizer();
        let opts = EncodeOptions::default();

        let batch = tok.encode_input(&"playing".into(), &opts).unwrap();
        assert_eq!(batch.input_ids(), vec![vec![2, 4, 5, 3]]);

        let batch = tok
            .encode_input(
                &TextInput::Batch(vec!["hello world".to_string(), "xyz".to_string()]),
                &opts.with_padding(PaddingStrategy::Longest),
            )
            .unwrap();
        assert_eq!(batch.input_ids(), vec![vec![2, 12, 13, 3], vec![2, 0, 3, 1]]);
        assert_eq!(batch.attention_masks()[1], vec![1, 1, 1, 0]);

        assert!(
            tok.encode_input(&TextInput::Batch(vec![]), &opts)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_round_trip() {
        let tok = tokenizer();
        let batch = tok
            .encode_input(&"Hello, World!".into(), &EncodeOptions::default())
            .unwrap();
        let text = tok
            .try_decode_to_string(&batch.rows[0].ids)
            .unwrap()
            .try_result()
            .unwrap();
        assert_eq!(text, "hello, world!");
    }

    #[test]
    fn test_errors_are_whole_batch() {
        let tok = tokenizer();
        let opts = EncodeOptions::default().with_max_input_bytes(4);
        let texts = vec!["ok".to_string(), "too long".to_string()];
        assert!(matches!(
            tok.try_encode_batch(&texts, &opts),
            Err(PiecemealError::InputTooLarge { index: 1, .. })
        ));
    }

    #[test]
    fn test_input_limits_follow_options() {
        let tok = tokenizer();

        let small = WindowOptions::new(4, 1).with_max_input_bytes(4);
        assert!(matches!(
            tok.try_encode_windows("the cat", &small),
            Err(PiecemealError::InputTooLarge { index: 0, size: 7, limit: 4 })
        ));
        assert_eq!(
            tok.try_encode_windows("the cat", &small.with_max_input_bytes(None))
                .unwrap()
                .len(),
            1
        );

        let long = vec!["the cat ".repeat(DEFAULT_MAX_INPUT_BYTES / 8 + 1)];
        assert!(tok.try_encode_examples(&long).is_err());
        let batch = tok
            .try_encode_batch(&long, &EncodeOptions::default().with_max_input_bytes(None))
            .unwrap();
        assert_eq!(batch.rows[0].len(), 512);
    }

    #[test]
    fn test_keyed_batches() {
        let tok = TokenizerOptions::default()
            .with_parallel(true)
            .with_cache(crate::cache::CacheOptions::default())
            .build(Arc::new(build_test_wordpiece_vocab::<u32>()))
            .unwrap();
        let docs = vec![
            ("a", "the cat sat on the mat".to_string()),
            ("b", "hello world".to_string()),
        ];
        let batches: Vec<_> = tok
            .keyed_batches(docs, KeyedBatchOptions::new(5, 2, 1))
            .unwrap()
            .collect::<PMResult<_>>()
            .unwrap();

        let ids: Vec<Vec<Vec<u32>>> = batches.iter().map(|b| b.rows.input_ids()).collect();
        assert_eq!(
            ids,
            vec![
                vec![vec![2, 7, 8, 9, 3], vec![2, 9, 10, 7, 3]],
                vec![vec![2, 7, 11, 3, 1], vec![2, 12, 13, 3, 1]],
            ]
        );
        let keys: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.ranges.iter().flatten().map(|r| r.key))
            .collect();
        assert_eq!(keys, vec!["a", "a", "a", "b"]);
    }

    #[test]
    fn test_encode_batch_fn() {
        let vocab = Arc::new(build_test_wordpiece_vocab::<u32>());
        let batch = encode_batch(vocab, &["playing".to_string()], &EncodeOptions::default())
            .unwrap();
        assert_eq!(batch.rows[0].ids, vec![2, 4, 5, 3]);
    }

    #[test]
    fn test_windows() {
        let tok = tokenizer();
        let windows = tok
            .try_encode_windows("the cat sat on the mat", &WindowOptions::new(4, 1))
            .unwrap();
        let ids: Vec<Vec<u32>> = windows.into_iter().map(|w| w.ids).collect();
        assert_eq!(
            ids,
            vec![
                vec![2, 7, 8, 3],
                vec![2, 8, 9, 3],
                vec![2, 9, 10, 3],
                vec![2, 10, 7, 3],
                vec![2, 7, 11, 3],
            ]
        );
    }
}
