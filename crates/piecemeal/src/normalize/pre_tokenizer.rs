//! # Pre-Tokenizer
//!
//! Splits normalized text into words: on whitespace (dropped), and
//! around each punctuation char (kept, as its own word).

use core::ops::Range;

use crate::normalize::{
    NormalizedText,
    char_classes::{is_punctuation, is_whitespace},
};

/// A word of normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    /// The byte range in the normalized text.
    pub normalized: Range<usize>,

    /// The byte range in the original text.
    pub original: Range<usize>,
}

impl WordSpan {
    /// The word text.
    pub fn text<'a>(
        &self,
        normalized: &'a NormalizedText,
    ) -> &'a str {
        &normalized.as_str()[self.normalized.clone()]
    }
}

/// Split normalized text into words, with their original offsets.
pub fn pretokenize(normalized: &NormalizedText) -> Vec<WordSpan> {
    split_words(normalized.as_str())
        .map(|range| WordSpan {
            original: normalized.original_range(range.clone()),
            normalized: range,
        })
        .collect()
}

/// Split `text` into word ranges.
///
/// ## Arguments
/// * `text` - normalized text.
///
/// ## Returns
/// An iterator of non-empty byte ranges into `text`, in order.
pub fn split_words(text: &str) -> WordSplitter<'_> {
    WordSplitter {
        text,
        chars: text.char_indices(),
        pending: None,
    }
}

/// Iterator over word ranges; see [`split_words`].
#[derive(Debug, Clone)]
pub struct WordSplitter<'a> {
    text: &'a str,
    chars: core::str::CharIndices<'a>,
    pending: Option<Range<usize>>,
}

impl<'a> WordSplitter<'a> {
    /// The text being split.
    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl Iterator for WordSplitter<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(punct) = self.pending.take() {
            return Some(punct);
        }

        let mut word_start: Option<usize> = None;
        for (idx, c) in self.chars.by_ref() {
            if is_whitespace(c) {
                if let Some(start) = word_start {
                    return Some(start..idx);
                }
            } else if is_punctuation(c) {
                let punct = idx..idx + c.len_utf8();
                match word_start {
                    Some(start) => {
                        self.pending = Some(punct);
                        return Some(start..idx);
                    }
                    None => return Some(punct),
                }
            } else if word_start.is_none() {
                word_start = Some(idx);
            }
        }

        word_start.map(|start| start..self.text.len())
    }
}
