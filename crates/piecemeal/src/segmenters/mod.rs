//! # Subword Segmenters
//!
//! A [`SpanSegmenter`] turns one pre-tokenized word into vocabulary ids:
//! * [`WordPieceSegmenter`] - greedy longest-match-first,
//! * [`BpeSegmenter`] - ranked pair merging.
//!
//! Both are pure functions of (word, vocabulary, merge table);
//! [`SegmenterSelector`] picks one for a vocabulary's model.

mod bpe_segmenter;
mod segmenter_selector;
mod span_segmenter;
mod wordpiece_segmenter;

#[doc(inline)]
pub use bpe_segmenter::*;
#[doc(inline)]
pub use segmenter_selector::*;
#[doc(inline)]
pub use span_segmenter::*;
#[doc(inline)]
pub use wordpiece_segmenter::*;
