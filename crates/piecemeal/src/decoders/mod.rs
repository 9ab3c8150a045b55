//! # Token Decoders
//!
//! [`PieceDecoder`] turns ids back into (normalized) text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use piecemeal::{
//!     decoders::{PieceDecoder, TokenDecoder},
//!     vocab::TokenizerVocab,
//! };
//!
//! fn example(vocab: Arc<TokenizerVocab<u32>>, ids: &[u32]) -> String {
//!     let decoder = PieceDecoder::new(vocab);
//!     decoder.try_decode_to_string(ids).unwrap().value
//! }
//! ```

mod decode_options;
mod decode_results;
mod piece_decoder;
mod token_decoder;

#[doc(inline)]
pub use decode_options::*;
#[doc(inline)]
pub use decode_results::*;
#[doc(inline)]
pub use piece_decoder::*;
#[doc(inline)]
pub use token_decoder::*;
