//! # Normalization and Pre-Tokenization
//!
//! Raw text passes through three stages before subword segmentation:
//! * [`AddedTokens`] - literal tokens are matched on the raw text,
//! * [`Normalizer`] - the remaining text is cleaned, case-folded, and
//!   accent-stripped per [`NormalizerConfig`], keeping a byte alignment
//!   back to the raw input in [`NormalizedText`],
//! * [`pretokenize`] - normalized text is split into words.

pub mod added_tokens;
pub mod char_classes;
pub mod normalized_text;
pub mod normalizer;
pub mod normalizer_config;
pub mod pre_tokenizer;

#[doc(inline)]
pub use added_tokens::{AddedToken, AddedTokens, TextSegment};
#[doc(inline)]
pub use normalized_text::NormalizedText;
#[doc(inline)]
pub use normalizer::Normalizer;
#[doc(inline)]
pub use normalizer_config::NormalizerConfig;
#[doc(inline)]
pub use pre_tokenizer::{WordSpan, WordSplitter, pretokenize, split_words};
