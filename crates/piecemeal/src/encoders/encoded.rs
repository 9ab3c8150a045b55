//! # Encoded Rows

use core::ops::Range;

use crate::TokenType;

/// One encoded input: ids with parallel offsets and masks.
///
/// All six vectors always have the same length. Offsets are byte ranges
/// into the original input; special and padding tokens carry `0..0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedExample<T: TokenType> {
    /// The token ids.
    pub ids: Vec<T>,

    /// The original byte range of each token.
    pub offsets: Vec<Range<usize>>,

    /// 1 for special and padding tokens, 0 for content tokens.
    pub special_tokens_mask: Vec<u8>,

    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<u8>,

    /// Segment ids; always 0 for single-sequence inputs.
    pub token_type_ids: Vec<u8>,

    /// The index of the pre-tokenized word each content token belongs to;
    /// `None` for special and padding tokens.
    pub word_ids: Vec<Option<u32>>,
}

impl<T: TokenType> EncodedExample<T> {
    /// Create an empty example with room for `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            offsets: Vec::with_capacity(capacity),
            special_tokens_mask: Vec::with_capacity(capacity),
            attention_mask: Vec::with_capacity(capacity),
            token_type_ids: Vec::with_capacity(capacity),
            word_ids: Vec::with_capacity(capacity),
        }
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Is the example empty?
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The number of non-padding tokens.
    pub fn real_len(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }

    /// Append a content token that is a whole word.
    pub fn push_token(
        &mut self,
        id: T,
        offset: Range<usize>,
    ) {
        self.push_piece(id, offset, true);
    }

    /// Append a content token.
    ///
    /// ## Arguments
    /// * `id` - the token id.
    /// * `offset` - the original byte range.
    /// * `starts_word` - open a new word; otherwise extend the last one.
    pub fn push_piece(
        &mut self,
        id: T,
        offset: Range<usize>,
        starts_word: bool,
    ) {
        let word = match self.word_ids.iter().rev().find_map(|w| *w) {
            Some(last) if starts_word => last + 1,
            Some(last) => last,
            None => 0,
        };
        self.push(id, offset, Some(word), 0, 1);
    }

    /// Append a special token.
    pub fn push_special(
        &mut self,
        id: T,
    ) {
        self.push(id, 0..0, None, 1, 1);
    }

    /// Append a padding token.
    pub fn push_padding(
        &mut self,
        id: T,
    ) {
        self.push(id, 0..0, None, 1, 0);
    }

    fn push(
        &mut self,
        id: T,
        offset: Range<usize>,
        word: Option<u32>,
        special: u8,
        attention: u8,
    ) {
        self.ids.push(id);
        self.offsets.push(offset);
        self.special_tokens_mask.push(special);
        self.attention_mask.push(attention);
        self.token_type_ids.push(0);
        self.word_ids.push(word);
    }

    /// The index of the first token of the word holding token `index`.
    ///
    /// Special and padding tokens are their own word.
    pub fn word_start(
        &self,
        index: usize,
    ) -> usize {
        let Some(word) = self.word_ids[index] else {
            return index;
        };
        let mut start = index;
        while start > 0 && self.word_ids[start - 1] == Some(word) {
            start -= 1;
        }
        start
    }

    /// Append the tokens of `other` in `range`.
    pub fn extend_from(
        &mut self,
        other: &Self,
        range: Range<usize>,
    ) {
        self.ids.extend_from_slice(&other.ids[range.clone()]);
        self.offsets.extend_from_slice(&other.offsets[range.clone()]);
        self.special_tokens_mask
            .extend_from_slice(&other.special_tokens_mask[range.clone()]);
        self.attention_mask
            .extend_from_slice(&other.attention_mask[range.clone()]);
        self.token_type_ids
            .extend_from_slice(&other.token_type_ids[range.clone()]);
        self.word_ids.extend_from_slice(&other.word_ids[range]);
    }

    /// The approximate heap footprint, in bytes.
    pub fn heap_size(&self) -> usize {
        let per_token =
            size_of::<T>() + size_of::<Range<usize>>() + size_of::<Option<u32>>() + 3;
        self.len() * per_token
    }
}

/// A batch of encoded rows, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBatch<T: TokenType> {
    /// The rows; row `i` encodes input `i`.
    pub rows: Vec<EncodedExample<T>>,
}

impl<T: TokenType> From<Vec<EncodedExample<T>>> for EncodedBatch<T> {
    fn from(rows: Vec<EncodedExample<T>>) -> Self {
        Self { rows }
    }
}

impl<T: TokenType> EncodedBatch<T> {
    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Is the batch empty?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> core::slice::Iter<'_, EncodedExample<T>> {
        self.rows.iter()
    }

    /// Do all rows have the same length?
    pub fn is_rectangular(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].len() == w[1].len())
    }

    /// The ids of every row.
    pub fn input_ids(&self) -> Vec<Vec<T>> {
        self.rows.iter().map(|r| r.ids.clone()).collect()
    }

    /// The attention mask of every row.
    pub fn attention_masks(&self) -> Vec<Vec<u8>> {
        self.rows
            .iter()
            .map(|r| r.attention_mask.clone())
            .collect()
    }

    /// Consume the batch, returning the rows.
    pub fn into_rows(self) -> Vec<EncodedExample<T>> {
        self.rows
    }
}

impl<'a, T: TokenType> IntoIterator for &'a EncodedBatch<T> {
    type Item = &'a EncodedExample<T>;
    type IntoIter = core::slice::Iter<'a, EncodedExample<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
