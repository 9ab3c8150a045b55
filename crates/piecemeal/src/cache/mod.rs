//! # Encode Caching
//!
//! [`CachedEncoder`] fronts any [`TokenEncoder`](crate::encoders::TokenEncoder)
//! with an [`EncodeCache`]: an LRU bounded by entries and bytes.

mod cached_encoder;
mod encode_cache;

#[doc(inline)]
pub use cached_encoder::*;
#[doc(inline)]
pub use encode_cache::*;
