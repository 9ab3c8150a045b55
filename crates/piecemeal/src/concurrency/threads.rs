//! # Thread Utilities

use core::{
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    str::FromStr,
};
use std::{collections::hash_map::DefaultHasher, env, thread};

/// A stable per-thread hash, for slotting threads into a pool.
pub fn current_thread_slot_hash() -> usize {
    let mut hasher = DefaultHasher::new();
    thread::current().id().hash(&mut hasher);
    hasher.finish() as usize
}

/// The search list of environment variables that Rayon uses to control parallelism.
#[cfg(feature = "rayon")]
const RAYON_VARS: &[&str] = &["RAYON_NUM_THREADS", "RAYON_RS_NUM_CPUS"];

/// Get the max parallelism available.
///
/// When `rayon` is enabled, will scan over `RAYON_VARS`.
pub fn est_max_parallelism() -> usize {
    #[cfg(feature = "rayon")]
    for name in RAYON_VARS {
        if let Some(x @ 1..) = env::var(name).ok().and_then(|s| usize::from_str(&s).ok()) {
            return x;
        }
    }

    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Resolve the max pool size.
///
/// ``min(max_pool, est_max_parallelism())``
pub fn resolve_max_pool(max_pool: Option<NonZeroUsize>) -> usize {
    let sys_max = est_max_parallelism();

    let max_pool = max_pool.map(|x| x.get()).unwrap_or(sys_max);

    core::cmp::min(max_pool, sys_max)
}
