//! # Encoders
//!
//! A [`TokenEncoder`] turns text into [`EncodedExample`] rows:
//! * [`PieceEncoder`] - the core per-example pipeline,
//! * [`post_process`] - special tokens, truncation, and padding,
//! * [`windows`] - overlapping windows over long inputs,
//! * [`keyed_batches`] - fixed-shape batches over keyed documents.
//!
//! Batch parallelism and caching are layered on by wrapping encoders;
//! see [`crate::concurrency`] and [`crate::cache`].

mod encode_options;
mod encoded;
pub mod keyed_batches;
mod piece_encoder;
pub mod post_process;
mod token_encoder;
pub mod windows;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[doc(inline)]
pub use encode_options::*;
#[doc(inline)]
pub use encoded::*;
#[doc(inline)]
pub use keyed_batches::{
    KeyedBatch,
    KeyedBatchOptions,
    KeyedBatches,
    TokenizedRange,
    keyed_batches,
};
#[doc(inline)]
pub use piece_encoder::*;
#[doc(inline)]
pub use token_encoder::*;
#[doc(inline)]
pub use windows::WindowOptions;
