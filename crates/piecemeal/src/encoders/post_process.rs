//! # Post-Processing
//!
//! Turns raw content encodings into model rows:
//! 1. truncate content from the tail, to fit `max_length` with its framing,
//! 2. frame with the start and end tokens,
//! 3. pad rows per the [`PaddingStrategy`].

use core::ops::Range;

use crate::{
    TokenType,
    encoders::{EncodeOptions, EncodedExample, PaddingStrategy},
    vocab::SpecialTokens,
};

/// Frame `content[range]` as one row.
///
/// ## Arguments
/// * `specials` - supplies the start and end ids.
/// * `content` - a raw content encoding.
/// * `range` - the token range of `content` to keep.
/// * `add_special_tokens` - frame with the start and end tokens.
pub fn frame_range<T: TokenType>(
    specials: &SpecialTokens<T>,
    content: &EncodedExample<T>,
    range: Range<usize>,
    add_special_tokens: bool,
) -> EncodedExample<T> {
    let framing = if add_special_tokens { 2 } else { 0 };
    let mut row = EncodedExample::with_capacity(range.len() + framing);
    if add_special_tokens {
        row.push_special(specials.start().id);
    }
    row.extend_from(content, range);
    if add_special_tokens {
        row.push_special(specials.end().id);
    }
    row
}

/// Truncate and frame a raw content encoding.
///
/// When truncating, the row is at most `max_length` long, and the end
/// token stays last.
pub fn truncate_and_frame<T: TokenType>(
    specials: &SpecialTokens<T>,
    content: &EncodedExample<T>,
    options: &EncodeOptions,
) -> EncodedExample<T> {
    let keep = match options.content_budget() {
        Some(budget) => content.len().min(budget),
        None => content.len(),
    };
    frame_range(specials, content, 0..keep, options.add_special_tokens)
}

/// The padded row length for a batch, if padding applies.
pub fn padding_target<T: TokenType>(
    rows: &[EncodedExample<T>],
    options: &EncodeOptions,
) -> Option<usize> {
    match options.padding {
        PaddingStrategy::DoNotPad => None,
        PaddingStrategy::Longest => Some(rows.iter().map(|r| r.len()).max().unwrap_or(0)),
        PaddingStrategy::MaxLength => options.max_length,
    }
}

/// Right-pad every row to the batch's padding target.
pub fn pad_rows<T: TokenType>(
    rows: &mut [EncodedExample<T>],
    options: &EncodeOptions,
    pad_id: T,
) {
    let Some(target) = padding_target(rows, options) else {
        return;
    };
    for row in rows.iter_mut() {
        while row.len() < target {
            row.push_padding(pad_id);
        }
    }
}
