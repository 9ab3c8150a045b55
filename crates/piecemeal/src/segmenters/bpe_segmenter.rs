//! # Priority-merge BPE [`SpanSegmenter`].
//!
//! Uses a binary min-heap over a doubly-linked list of symbols; each
//! merge removes one symbol, so a word of `n` chars takes at most
//! `n - 1` merges and O(n log n) time.

use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    TokenType,
    segmenters::{Piece, SpanSegmenter},
    vocab::{ModelConfig, TokenizerVocab},
};

const NONE: u32 = u32::MAX;

#[derive(Debug)]
struct Node<T> {
    token: T,
    prev: u32,
    next: u32,
    start: usize,
    end: usize,
}

/// Heap entry representing a potential merge.
///
/// Ordered by (rank, `left_idx`) so the lowest-rank, leftmost pair is popped first.
/// `left_tok` and `right_tok` are stored for O(1) stale-entry detection.
#[derive(Debug, Eq)]
struct MergeEntry<T: TokenType> {
    rank: u32,
    left_idx: u32,
    left_tok: T,
    right_tok: T,
    merged: T,
}

impl<T: TokenType> PartialEq for MergeEntry<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rank == other.rank && self.left_idx == other.left_idx
    }
}

impl<T: TokenType> Ord for MergeEntry<T> {
    fn cmp(
        &self,
        other: &Self,
    ) -> core::cmp::Ordering {
        self.rank
            .cmp(&other.rank)
            .then(self.left_idx.cmp(&other.left_idx))
    }
}

impl<T: TokenType> PartialOrd for MergeEntry<T> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A BPE [`SpanSegmenter`].
///
/// Words start as single-char symbols (the first bare, the rest carrying
/// the continuation prefix and the last the end-of-word suffix, when the
/// model declares them). Symbols absent from the vocabulary become the
/// unknown token.
pub struct BpeSegmenter<T: TokenType> {
    nodes: Vec<Node<T>>,
    heap: BinaryHeap<Reverse<MergeEntry<T>>>,
    symbol: String,
}

impl<T: TokenType> Default for BpeSegmenter<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            heap: BinaryHeap::new(),
            symbol: String::new(),
        }
    }
}

impl<T: TokenType> core::fmt::Debug for BpeSegmenter<T> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("BpeSegmenter").finish()
    }
}

impl<T: TokenType> Clone for BpeSegmenter<T> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T: TokenType> BpeSegmenter<T> {
    fn push_candidate(
        &mut self,
        vocab: &TokenizerVocab<T>,
        left_idx: u32,
    ) {
        let left = &self.nodes[left_idx as usize];
        if left.next == NONE {
            return;
        }
        let left_tok = left.token;
        let right_tok = self.nodes[left.next as usize].token;
        if let Some(rule) = vocab.merges().lookup(left_tok, right_tok) {
            self.heap.push(Reverse(MergeEntry {
                rank: rule.rank,
                left_idx,
                left_tok,
                right_tok,
                merged: rule.merged,
            }));
        }
    }
}

impl<T: TokenType> SpanSegmenter<T> for BpeSegmenter<T> {
    fn segment_append(
        &mut self,
        vocab: &TokenizerVocab<T>,
        word: &str,
        pieces: &mut Vec<Piece<T>>,
    ) {
        let model = vocab.model();
        let prefix = model.continuing_subword_prefix();
        let suffix = model.end_of_word_suffix();
        let fuse_unknown = matches!(model, ModelConfig::Bpe(cfg) if cfg.fuse_unknown);
        let unknown = vocab.specials().unknown_id();

        // Build doubly-linked list of char symbols.
        self.nodes.clear();
        let n = word.chars().count();
        for (pos, (start, c)) in word.char_indices().enumerate() {
            self.symbol.clear();
            if pos > 0
                && let Some(prefix) = prefix
            {
                self.symbol.push_str(prefix);
            }
            self.symbol.push(c);
            if pos + 1 == n
                && let Some(suffix) = suffix
            {
                self.symbol.push_str(suffix);
            }

            self.nodes.push(Node {
                token: vocab.lookup(&self.symbol).unwrap_or(unknown),
                prev: if pos == 0 { NONE } else { (pos - 1) as u32 },
                next: if pos + 1 < n { (pos + 1) as u32 } else { NONE },
                start,
                end: start + c.len_utf8(),
            });
        }
        if self.nodes.is_empty() {
            return;
        }

        // Seed the heap with all initially-mergeable adjacent pairs.
        self.heap.clear();
        for i in 0..(n - 1) {
            self.push_candidate(vocab, i as u32);
        }

        // Process merges in priority order (lowest rank first).
        while let Some(Reverse(entry)) = self.heap.pop() {
            let li = entry.left_idx as usize;

            let ri_u32 = self.nodes[li].next;
            if ri_u32 == NONE {
                continue;
            }
            let ri = ri_u32 as usize;

            // Bidirectional adjacency + token freshness.
            if self.nodes[ri].prev != entry.left_idx
                || self.nodes[li].token != entry.left_tok
                || self.nodes[ri].token != entry.right_tok
            {
                continue;
            }

            // Merge: left absorbs right.
            let right_next = self.nodes[ri].next;
            let right_end = self.nodes[ri].end;
            {
                let left = &mut self.nodes[li];
                left.token = entry.merged;
                left.next = right_next;
                left.end = right_end;
            }
            self.nodes[ri].prev = NONE;
            self.nodes[ri].next = NONE;
            if right_next != NONE {
                self.nodes[right_next as usize].prev = entry.left_idx;
            }

            // Enqueue new neighbor pairs.
            let left_prev = self.nodes[li].prev;
            if left_prev != NONE {
                self.push_candidate(vocab, left_prev);
            }
            self.push_candidate(vocab, entry.left_idx);
        }

        // Collect final symbols by walking the linked list.
        let mut idx = 0u32;
        let mut last_unknown = false;
        while idx != NONE {
            let node = &self.nodes[idx as usize];
            let is_unknown = node.token == unknown;
            match pieces.last_mut() {
                Some(last) if fuse_unknown && is_unknown && last_unknown => {
                    last.range.end = node.end;
                }
                _ => pieces.push(Piece::new(node.token, node.start..node.end)),
            }
            last_unknown = is_unknown;
            idx = node.next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        normalize::NormalizerConfig,
        vocab::{BpeConfig, SpecialTokenNames, WordVocab},
    };

    fn bpe_vocab(
        cfg: BpeConfig,
        tokens: &[&str],
        merges: &[(&str, &str)],
    ) -> TokenizerVocab<u32> {
        let mut all = vec!["<unk>", "<pad>", "<s>", "</s>"];
        all.extend_from_slice(tokens);
        let merges: Vec<(String, String)> = merges
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        TokenizerVocab::new(
            ModelConfig::Bpe(cfg),
            WordVocab::from_tokens(all).unwrap(),
            &merges,
            SpecialTokenNames::roberta(),
            vec![],
            NormalizerConfig::passthrough(),
        )
        .unwrap()
    }

    fn segment(
        vocab: &TokenizerVocab<u32>,
        word: &str,
    ) -> Vec<(String, core::ops::Range<usize>)> {
        let mut seg = BpeSegmenter::<u32>::default();
        seg.segment(vocab, word)
            .into_iter()
            .map(|p| (vocab.id_to_token(p.token).unwrap().to_string(), p.range))
            .collect()
    }

    #[test]
    fn test_merges_by_rank() {
        let vocab = bpe_vocab(
            BpeConfig::default(),
            &["l", "o", "w", "e", "r", "lo", "low", "er", "lower"],
            &[("l", "o"), ("lo", "w"), ("e", "r"), ("low", "er")],
        );
        assert_eq!(segment(&vocab, "low"), vec![("low".to_string(), 0..3)]);
        assert_eq!(segment(&vocab, "lower"), vec![("lower".to_string(), 0..5)]);
        assert_eq!(
            segment(&vocab, "rowel"),
            vec![
                ("r".to_string(), 0..1),
                ("o".to_string(), 1..2),
                ("w".to_string(), 2..3),
                ("e".to_string(), 3..4),
                ("l".to_string(), 4..5),
            ]
        );
    }

    #[test]
    fn test_rank_order_not_position() {
        // "ab" outranks "bc", so "abc" -> "ab" + "c"; never "a" + "bc".
        let vocab = bpe_vocab(
            BpeConfig::default(),
            &["a", "b", "c", "ab", "bc"],
            &[("a", "b"), ("b", "c")],
        );
        assert_eq!(
            segment(&vocab, "abc"),
            vec![("ab".to_string(), 0..2), ("c".to_string(), 2..3)]
        );

        let vocab = bpe_vocab(
            BpeConfig::default(),
            &["a", "b", "c", "ab", "bc"],
            &[("b", "c"), ("a", "b")],
        );
        assert_eq!(
            segment(&vocab, "abc"),
            vec![("a".to_string(), 0..1), ("bc".to_string(), 1..3)]
        );
    }

    #[test]
    fn test_leftmost_wins_on_repeats() {
        let vocab = bpe_vocab(BpeConfig::default(), &["a", "aa"], &[("a", "a")]);
        assert_eq!(
            segment(&vocab, "aaa"),
            vec![("aa".to_string(), 0..2), ("a".to_string(), 2..3)]
        );
    }

    #[test]
    fn test_unknown_symbols() {
        let vocab = bpe_vocab(BpeConfig::default(), &["a", "b", "ab"], &[("a", "b")]);
        assert_eq!(
            segment(&vocab, "abxy"),
            vec![
                ("ab".to_string(), 0..2),
                ("<unk>".to_string(), 2..3),
                ("<unk>".to_string(), 3..4),
            ]
        );

        let fused = bpe_vocab(
            BpeConfig {
                fuse_unknown: true,
                ..Default::default()
            },
            &["a", "b", "ab"],
            &[("a", "b")],
        );
        assert_eq!(
            segment(&fused, "abxyz"),
            vec![("ab".to_string(), 0..2), ("<unk>".to_string(), 2..5)]
        );
    }

    #[test]
    fn test_prefix_and_suffix() {
        let vocab = bpe_vocab(
            BpeConfig {
                continuing_subword_prefix: Some("##".to_string()),
                end_of_word_suffix: Some("</w>".to_string()),
                fuse_unknown: false,
            },
            &["h", "##i", "##i</w>", "hi</w>", "h</w>"],
            &[("h", "##i</w>")],
        );
        assert_eq!(segment(&vocab, "hi"), vec![("hi</w>".to_string(), 0..2)]);
        assert_eq!(segment(&vocab, "h"), vec![("h</w>".to_string(), 0..1)]);
    }

    #[test]
    fn test_multibyte_offsets() {
        let vocab = bpe_vocab(BpeConfig::default(), &["é", "t", "ét"], &[("é", "t")]);
        assert_eq!(segment(&vocab, "ét"), vec![("ét".to_string(), 0..3)]);
    }

    #[test]
    fn test_reuse_is_pure() {
        let vocab = bpe_vocab(
            BpeConfig::default(),
            &["l", "o", "w", "lo", "low"],
            &[("l", "o"), ("lo", "w")],
        );
        let mut seg = BpeSegmenter::<u32>::default();
        let first = seg.segment(&vocab, "lowlow");
        let _ = seg.segment(&vocab, "ol");
        assert_eq!(seg.segment(&vocab, "lowlow"), first);
    }
}
