//! # Concurrency Support
//!
//! * [`PoolToy`] - a per-thread pool of scratch state,
//! * [`threads`] - parallelism estimates,
//! * `ParallelRayonEncoder` - batch parallelism, with the `rayon` feature.

pub mod pool_toy;
pub mod threads;

#[cfg(feature = "rayon")]
pub mod rayon_encoder;

#[doc(inline)]
pub use pool_toy::PoolToy;
#[cfg(feature = "rayon")]
#[doc(inline)]
pub use rayon_encoder::ParallelRayonEncoder;
