//! # Normalized Text with Offset Alignment

use core::ops::Range;

/// Normalized text, aligned back to the original input.
///
/// Each byte of `text` maps to the byte range of the original character
/// it was derived from; so any normalized range can be projected back
/// onto the caller's input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    alignments: Vec<(usize, usize)>,
}

impl NormalizedText {
    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            alignments: Vec::with_capacity(capacity),
        }
    }

    /// Build a buffer holding `text` unchanged, starting at `base_offset`.
    pub fn identity(
        text: &str,
        base_offset: usize,
    ) -> Self {
        let mut buf = Self::with_capacity(text.len());
        for (idx, c) in text.char_indices() {
            let start = base_offset + idx;
            buf.push(c, start..start + c.len_utf8());
        }
        buf
    }

    /// Append a normalized char derived from the `original` byte range.
    pub fn push(
        &mut self,
        c: char,
        original: Range<usize>,
    ) {
        self.text.push(c);
        let span = (original.start, original.end);
        self.alignments
            .extend(core::iter::repeat_n(span, c.len_utf8()));
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The normalized length, in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Is the normalized text empty?
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Project a normalized byte range onto the original input.
    ///
    /// An empty or out-of-bounds range maps to an empty range.
    pub fn original_range(
        &self,
        normalized: Range<usize>,
    ) -> Range<usize> {
        if normalized.is_empty() || normalized.end > self.alignments.len() {
            let at = self
                .alignments
                .get(normalized.start)
                .map(|&(s, _)| s)
                .or_else(|| self.alignments.last().map(|&(_, e)| e))
                .unwrap_or(0);
            return at..at;
        }
        let start = self.alignments[normalized.start].0;
        let end = self.alignments[normalized.end - 1].1;
        start..end.max(start)
    }
}
