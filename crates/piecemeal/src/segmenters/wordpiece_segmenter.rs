//! # Greedy longest-match-first [`SpanSegmenter`].

use crate::{
    TokenType,
    segmenters::{Piece, SpanSegmenter},
    vocab::{ModelConfig, TokenizerVocab, model_config::DEFAULT_MAX_INPUT_CHARS_PER_WORD},
};

/// A `WordPiece` [`SpanSegmenter`].
///
/// At each position, emits the longest vocabulary entry which prefixes
/// the remaining text; non-initial entries are looked up through the
/// continuation map. If any position has no match, the whole word
/// becomes one unknown token. Words longer than
/// `max_input_chars_per_word` chars become unknown without a search,
/// which bounds the work per word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordPieceSegmenter;

impl<T: TokenType> SpanSegmenter<T> for WordPieceSegmenter {
    fn segment_append(
        &mut self,
        vocab: &TokenizerVocab<T>,
        word: &str,
        pieces: &mut Vec<Piece<T>>,
    ) {
        let max_chars = match vocab.model() {
            ModelConfig::WordPiece(cfg) => cfg.max_input_chars_per_word,
            ModelConfig::Bpe(_) => DEFAULT_MAX_INPUT_CHARS_PER_WORD,
        };
        let unknown = Piece::new(vocab.specials().unknown_id(), 0..word.len());

        if word.chars().nth(max_chars).is_some() {
            pieces.push(unknown);
            return;
        }

        let has_prefix = vocab.model().continuing_subword_prefix().is_some();
        let rollback = pieces.len();

        let mut start = 0;
        while start < word.len() {
            let mut end = word.len();
            let mut found = None;
            while end > start {
                let sub = &word[start..end];
                let token = if start == 0 || !has_prefix {
                    vocab.lookup(sub)
                } else {
                    vocab.lookup_continuation(sub)
                };
                if token.is_some() {
                    found = token;
                    break;
                }
                // Step back one char.
                end = sub
                    .char_indices()
                    .next_back()
                    .map_or(start, |(idx, _)| start + idx);
            }

            match found {
                Some(token) => {
                    pieces.push(Piece::new(token, start..end));
                    start = end;
                }
                None => {
                    pieces.truncate(rollback);
                    pieces.push(unknown);
                    return;
                }
            }
        }
    }
}
