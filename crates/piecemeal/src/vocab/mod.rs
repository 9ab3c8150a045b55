//! # Vocabulary
//!
//! This module provides the vocabulary and related io mechanisms.
//!
//! ## Word Vocabulary
//!
//! [`WordVocab`] is the bidirectional ``{ String <-> T }`` map; ids are
//! contiguous from zero, and lookups borrow the caller's `&str`.
//!
//! ## Tokenizer Vocabulary
//!
//! The primary user-oriented vocabulary is [`TokenizerVocab`], which contains:
//! * `model` - a [`ModelConfig`] selecting `WordPiece` or BPE,
//! * `words` - a [`WordVocab`],
//! * `merges` - a [`MergeRules`] ``{ (T, T) -> (rank, T) }`` table,
//! * `specials` - the resolved [`SpecialTokens`],
//! * added tokens and the normalizer config.
//!
//! A [`TokenizerVocab`] is validated once, then shared read-only
//! (usually behind an `Arc`) by every encoder and decoder.

pub mod io;
pub mod merge_rules;
pub mod model_config;
pub mod special_tokens;
pub mod token_vocab;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod word_vocab;

#[doc(inline)]
pub use merge_rules::{MergeRule, MergeRules};
#[doc(inline)]
pub use model_config::{BpeConfig, ModelConfig, WordPieceConfig};
#[doc(inline)]
pub use special_tokens::{SpecialToken, SpecialTokenNames, SpecialTokens};
#[doc(inline)]
pub use token_vocab::TokenizerVocab;
#[doc(inline)]
pub use word_vocab::WordVocab;
