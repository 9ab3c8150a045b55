use core::ops::Range;

use crate::{TokenType, vocab::TokenizerVocab};

/// A token produced from a word, with its byte range in that word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece<T: TokenType> {
    /// The token id.
    pub token: T,

    /// The byte range within the word.
    pub range: Range<usize>,
}

impl<T: TokenType> Piece<T> {
    /// Create a piece.
    pub fn new(
        token: T,
        range: Range<usize>,
    ) -> Self {
        Self { token, range }
    }
}

/// A trait for segmenting words into subword tokens.
///
/// Implementations may hold scratch buffers between calls; the output
/// must depend only on the word and the vocabulary.
pub trait SpanSegmenter<T: TokenType>: Send {
    /// Segments a single word.
    ///
    /// ## Arguments
    /// * `vocab` - The reference vocabulary.
    /// * `word` - The normalized word; never empty.
    /// * `pieces` - The target piece buffer to append to.
    fn segment_append(
        &mut self,
        vocab: &TokenizerVocab<T>,
        word: &str,
        pieces: &mut Vec<Piece<T>>,
    );

    /// Segments a single word into a new buffer.
    fn segment(
        &mut self,
        vocab: &TokenizerVocab<T>,
        word: &str,
    ) -> Vec<Piece<T>> {
        let mut pieces = Vec::new();
        self.segment_append(vocab, word, &mut pieces);
        pieces
    }
}
