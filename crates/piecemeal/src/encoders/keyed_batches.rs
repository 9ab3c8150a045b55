//! # Keyed Document Batches
//!
//! Turns a stream of `(key, text)` documents into fixed-shape batches of
//! `batch_size` rows, each exactly `max_length` tokens long.
//!
//! A document longer than one row continues in the next row, which may
//! be in the next batch. A window never splits a word when it can avoid
//! it; the next window restarts at the first token of the word that did
//! not fit, preceded by `stride` tokens of overlap. Each row carries a
//! [`TokenizedRange`] mapping it back to its document.
//!
//! ```rust,no_run
//! use piecemeal::{
//!     PMResult,
//!     Tokenizer,
//!     encoders::keyed_batches::{KeyedBatchOptions, keyed_batches},
//! };
//!
//! fn example(tokenizer: &Tokenizer<u32>) -> PMResult<()> {
//!     let docs = vec![(17u64, "first document".to_string())];
//!     for batch in keyed_batches(tokenizer, docs, KeyedBatchOptions::new(512, 32, 0))? {
//!         let batch = batch?;
//!         assert_eq!(batch.rows.len(), 32);
//!     }
//!     Ok(())
//! }
//! ```

use core::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    PiecemealError,
    TokenType,
    encoders::{
        EncodedBatch,
        EncodedExample,
        TokenEncoder,
        check_input_size,
        post_process::frame_range,
        windows::WindowOptions,
    },
};

/// Where a row of a [`KeyedBatch`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedRange<K> {
    /// The document key.
    pub key: K,

    /// The byte offset in the document where this row's new content starts.
    pub offset: usize,

    /// `None` if the document ends in this row; otherwise the byte offset
    /// of the word the next row restarts at.
    pub last_tokenized_word_start_index: Option<usize>,
}

/// One fixed-shape batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedBatch<K, T: TokenType> {
    /// `batch_size` rows of `max_length` tokens each.
    pub rows: EncodedBatch<T>,

    /// One entry per row; `None` for the all-padding rows filling the
    /// final batch.
    pub ranges: Vec<Option<TokenizedRange<K>>>,
}

impl<K, T: TokenType> KeyedBatch<K, T> {
    /// The number of rows holding document content.
    pub fn filled(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }
}

/// Options for [`keyed_batches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedBatchOptions {
    /// Row length, stride, framing and the per-document byte ceiling.
    pub window: WindowOptions,

    /// Rows per batch.
    pub batch_size: usize,
}

impl KeyedBatchOptions {
    /// Create options with framed rows.
    ///
    /// ## Arguments
    /// * `tokens_per_input` - the row length, inclusive of special tokens.
    /// * `batch_size` - rows per batch.
    /// * `stride` - tokens of overlap when a document spans rows.
    pub fn new(
        tokens_per_input: usize,
        batch_size: usize,
        stride: usize,
    ) -> Self {
        Self {
            window: WindowOptions::new(tokens_per_input, stride),
            batch_size,
        }
    }

    /// Set the window options, and return the options.
    pub fn with_window(
        mut self,
        window: WindowOptions,
    ) -> Self {
        self.window = window;
        self
    }

    /// Check the options.
    ///
    /// ## Returns
    /// The content tokens per row; or a [`PiecemealError::Configuration`].
    pub fn validate(&self) -> PMResult<usize> {
        if self.batch_size == 0 {
            return Err(PiecemealError::config("batch_size must be positive"));
        }
        if self.window.max_input_bytes == Some(0) {
            return Err(PiecemealError::config("max_input_bytes must be positive"));
        }
        self.window.content_budget()
    }
}

/// Plan the next row of a document.
///
/// ## Arguments
/// * `content` - the document's content encoding.
/// * `start` - the first content token of the row, overlap included.
/// * `budget` - content tokens per row.
/// * `stride` - overlap tokens at the head of a continued row.
///
/// ## Returns
/// The content range of the row, and the token the next row restarts at,
/// if the document continues.
pub fn plan_window<T: TokenType>(
    content: &EncodedExample<T>,
    start: usize,
    budget: usize,
    stride: usize,
) -> (Range<usize>, Option<usize>) {
    let limit = (start + budget).min(content.len());
    if limit == content.len() {
        return (start..limit, None);
    }
    let mut end = content.word_start(limit);
    if end <= start + stride {
        // One word fills the row; cut inside it.
        end = limit;
    }
    (start..end, Some(end))
}

struct PendingDocument<K, T: TokenType> {
    key: K,
    content: Arc<EncodedExample<T>>,
    start: usize,
    offset: usize,
}

/// An iterator of [`KeyedBatch`]es over a document source.
///
/// Documents are pulled from the source only as rows need them. The
/// iterator ends after yielding the first error.
pub struct KeyedBatches<'a, K, T, E, I>
where
    T: TokenType,
    E: TokenEncoder<T> + ?Sized,
{
    encoder: &'a E,
    source: I,
    options: KeyedBatchOptions,
    budget: usize,
    pending: Option<PendingDocument<K, T>>,
    documents: usize,
    done: bool,
}

/// Batch keyed documents into fixed-shape rows.
///
/// ## Arguments
/// * `encoder` - the encoder producing content encodings.
/// * `source` - `(key, text)` documents.
/// * `options` - the row shape and batch size.
///
/// ## Returns
/// The batch iterator; or a [`PiecemealError::Configuration`] for
/// unusable options.
pub fn keyed_batches<'a, K, T, E, I>(
    encoder: &'a E,
    source: I,
    options: KeyedBatchOptions,
) -> PMResult<KeyedBatches<'a, K, T, E, I::IntoIter>>
where
    K: Clone,
    T: TokenType,
    E: TokenEncoder<T> + ?Sized,
    I: IntoIterator<Item = (K, String)>,
{
    let budget = options.validate()?;
    Ok(KeyedBatches {
        encoder,
        source: source.into_iter(),
        options,
        budget,
        pending: None,
        documents: 0,
        done: false,
    })
}

impl<K, T, E, I> KeyedBatches<'_, K, T, E, I>
where
    K: Clone,
    T: TokenType,
    E: TokenEncoder<T> + ?Sized,
    I: Iterator<Item = (K, String)>,
{
    fn open(
        &mut self,
        key: K,
        text: &str,
    ) -> PMResult<PendingDocument<K, T>> {
        let index = self.documents;
        self.documents += 1;
        check_input_size(index, text, self.options.window.max_input_bytes)?;
        Ok(PendingDocument {
            key,
            content: self.encoder.try_encode_unchecked(text)?,
            start: 0,
            offset: 0,
        })
    }

    fn padded(
        &self,
        mut row: EncodedExample<T>,
    ) -> EncodedExample<T> {
        let pad_id = self.encoder.vocab().specials().padding_id();
        while row.len() < self.options.window.max_length {
            row.push_padding(pad_id);
        }
        row
    }

    fn fill(&mut self) -> PMResult<Option<KeyedBatch<K, T>>> {
        let batch_size = self.options.batch_size;
        let stride = self.options.window.stride;
        let framed = self.options.window.add_special_tokens;

        let mut rows = Vec::with_capacity(batch_size);
        let mut ranges = Vec::with_capacity(batch_size);
        while rows.len() < batch_size {
            let doc = match self.pending.take() {
                Some(doc) => doc,
                None => match self.source.next() {
                    Some((key, text)) => self.open(key, &text)?,
                    None => break,
                },
            };

            let (range, restart) = plan_window(&doc.content, doc.start, self.budget, stride);
            let specials = self.encoder.vocab().specials();
            rows.push(self.padded(frame_range(specials, &doc.content, range, framed)));

            let restart_offset = restart.map(|idx| doc.content.offsets[idx].start);
            ranges.push(Some(TokenizedRange {
                key: doc.key.clone(),
                offset: doc.offset,
                last_tokenized_word_start_index: restart_offset,
            }));

            if let (Some(idx), Some(offset)) = (restart, restart_offset) {
                self.pending = Some(PendingDocument {
                    start: idx - stride,
                    offset,
                    ..doc
                });
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }
        while rows.len() < batch_size {
            rows.push(self.padded(EncodedExample::default()));
            ranges.push(None);
        }
        Ok(Some(KeyedBatch {
            rows: EncodedBatch::from(rows),
            ranges,
        }))
    }
}

impl<K, T, E, I> Iterator for KeyedBatches<'_, K, T, E, I>
where
    K: Clone,
    T: TokenType,
    E: TokenEncoder<T> + ?Sized,
    I: Iterator<Item = (K, String)>,
{
    type Item = PMResult<KeyedBatch<K, T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoders::PieceEncoder, vocab::testing::build_test_wordpiece_vocab};

    fn encoder() -> PieceEncoder<u32> {
        PieceEncoder::new(Arc::new(build_test_wordpiece_vocab()))
    }

    fn range(
        key: u32,
        offset: usize,
        restart: Option<usize>,
    ) -> Option<TokenizedRange<u32>> {
        Some(TokenizedRange {
            key,
            offset,
            last_tokenized_word_start_index: restart,
        })
    }

    fn collect(
        docs: Vec<(u32, &str)>,
        options: KeyedBatchOptions,
    ) -> Vec<KeyedBatch<u32, u32>> {
        let enc = encoder();
        let docs = docs.into_iter().map(|(k, t)| (k, t.to_string()));
        keyed_batches(&enc, docs, options)
            .unwrap()
            .collect::<PMResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_restart_at_cut_word() {
        let batches = collect(
            vec![(7, "playing played the cat")],
            KeyedBatchOptions::new(5, 4, 0),
        );
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(
            batch.rows.input_ids(),
            vec![
                vec![2, 4, 5, 3, 1],
                vec![2, 4, 6, 7, 3],
                vec![2, 8, 3, 1, 1],
                vec![1, 1, 1, 1, 1],
            ]
        );
        assert_eq!(
            batch.ranges,
            vec![
                range(7, 0, Some(8)),
                range(7, 8, Some(19)),
                range(7, 19, None),
                None
            ]
        );
        assert_eq!(batch.filled(), 3);
        assert_eq!(batch.rows.attention_masks()[3], vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_stride_overlap() {
        let batches = collect(
            vec![(1, "the cat sat on the mat")],
            KeyedBatchOptions::new(5, 3, 1),
        );
        let batch = &batches[0];
        assert_eq!(
            batch.rows.input_ids(),
            vec![
                vec![2, 7, 8, 9, 3],
                vec![2, 9, 10, 7, 3],
                vec![2, 7, 11, 3, 1],
            ]
        );
        assert_eq!(
            batch.ranges,
            vec![
                range(1, 0, Some(12)),
                range(1, 12, Some(19)),
                range(1, 19, None)
            ]
        );
    }

    #[test]
    fn test_documents_span_batches() {
        let batches = collect(
            vec![(1, "the cat"), (2, ""), (3, "hello world")],
            KeyedBatchOptions::new(4, 2, 0),
        );
        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[0].rows.input_ids(),
            vec![vec![2, 7, 8, 3], vec![2, 3, 1, 1]]
        );
        assert_eq!(
            batches[0].ranges,
            vec![range(1, 0, None), range(2, 0, None)]
        );
        assert_eq!(
            batches[1].rows.input_ids(),
            vec![vec![2, 12, 13, 3], vec![1, 1, 1, 1]]
        );
        assert_eq!(batches[1].ranges, vec![range(3, 0, None), None]);
        assert!(
            batches
                .iter()
                .all(|b| b.rows.iter().all(|row| row.len() == 4))
        );
    }

    #[test]
    fn test_word_longer_than_row() {
        let batches = collect(vec![(5, "unaffable")], KeyedBatchOptions::new(4, 2, 0));
        assert_eq!(
            batches[0].rows.input_ids(),
            vec![vec![2, 18, 19, 3], vec![2, 20, 3, 1]]
        );
        assert_eq!(
            batches[0].ranges,
            vec![range(5, 0, Some(5)), range(5, 5, None)]
        );
    }

    #[test]
    fn test_unframed_rows() {
        let options = KeyedBatchOptions::new(2, 2, 0)
            .with_window(WindowOptions::new(2, 0).with_add_special_tokens(false));
        let batches = collect(vec![(1, "the cat sat")], options);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].rows.input_ids(), vec![vec![7, 8], vec![9, 1]]);
        assert_eq!(
            batches[0].ranges,
            vec![range(1, 0, Some(8)), range(1, 8, None)]
        );
    }

    #[test]
    fn test_empty_source() {
        assert!(collect(vec![], KeyedBatchOptions::new(8, 2, 0)).is_empty());
    }

    #[test]
    fn test_bad_options() {
        let enc = encoder();
        for options in [
            KeyedBatchOptions::new(8, 0, 0),
            KeyedBatchOptions::new(4, 2, 2),
            KeyedBatchOptions::new(2, 2, 0),
        ] {
            assert!(matches!(
                keyed_batches(&enc, Vec::<(u32, String)>::new(), options),
                Err(PiecemealError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_oversized_document_ends_iteration() {
        let enc = encoder();
        let options = KeyedBatchOptions::new(8, 1, 0)
            .with_window(WindowOptions::new(8, 0).with_max_input_bytes(4));
        let docs = vec![(1u32, "cat".to_string()), (2, "the cat".to_string())];
        let mut batches = keyed_batches(&enc, docs, options).unwrap();

        assert!(batches.next().unwrap().is_ok());
        assert!(matches!(
            batches.next(),
            Some(Err(PiecemealError::InputTooLarge {
                index: 1,
                size: 7,
                limit: 4
            }))
        ));
        assert!(batches.next().is_none());
    }
}
