//! # `piecemeal` Subword Tokenizer
//!
//! A `WordPiece` / BPE subword tokenizer engine, compatible with BERT-style
//! and BPE-style transformer vocabularies.
//!
//! See:
//! * [`vocab`] to load and validate a [`vocab::TokenizerVocab`].
//! * [`normalize`] for normalization, added tokens, and pre-tokenization.
//! * [`segmenters`] for the `WordPiece` and BPE word segmenters.
//! * [`encoders`] to encode text into model rows.
//! * [`decoders`] to decode ids back into text.
//! * [`tokenizer`] for the combined, shareable [`Tokenizer`] handle.
//! * [`serving`] for the request-level serving adapter.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use piecemeal::{
//!     PMResult,
//!     Tokenizer,
//!     encoders::{EncodeOptions, PaddingStrategy, TokenEncoder},
//!     load_vocabulary,
//! };
//!
//! fn example() -> PMResult<()> {
//!     let vocab = Arc::new(load_vocabulary::<u32, _>("bert-base-uncased/vocab.txt")?);
//!     let tokenizer = Tokenizer::from_vocab(vocab);
//!
//!     let batch = tokenizer.try_encode_batch(
//!         &["hello world".to_string(), "playing".to_string()],
//!         &EncodeOptions::default().with_padding(PaddingStrategy::Longest),
//!     )?;
//!     assert_eq!(batch.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``rayon``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``; which is a performance
//! win on many/(most?) modern CPUs.
//!
//! This is done by the ``types::PM{*}`` type alias machinery.
//!
//! #### feature: ``foldhash``
//!
//! This swaps all HashMap/HashSet implementations for ``foldhash``.
//!
//! #### feature: ``rayon``
//!
//! This enables [`concurrency::ParallelRayonEncoder`], which shards batch
//! rows across the ``rayon`` pool.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! #### feature: ``testing``
//!
//! This exposes the shared test vocabularies and encoder checks to
//! downstream crates.
#![warn(missing_docs, unused)]

pub mod cache;
pub mod concurrency;
pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod normalize;
pub mod segmenters;
pub mod serving;
pub mod tokenizer;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use errors::{PMResult, PiecemealError};
#[doc(inline)]
pub use tokenizer::{TextInput, Tokenizer, TokenizerOptions, encode_batch};
#[doc(inline)]
pub use types::TokenType;
#[doc(inline)]
pub use vocab::{
    TokenizerVocab,
    io::{VocabFormat, load_vocabulary, load_vocabulary_with},
};
