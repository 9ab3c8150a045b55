//! # Thread Pool Toy

use core::{fmt::Debug, num::NonZeroUsize};

use crate::concurrency::threads::{current_thread_slot_hash, resolve_max_pool};

/// Current Thread -> T Pool.
///
/// A fixed vector of items, indexed by a hash of the current thread id.
/// Threads usually land on distinct slots, so slot locks are rarely
/// contended; correctness never depends on it.
pub struct PoolToy<T>
where
    T: Send,
{
    pool: Vec<T>,
}

impl<T> PoolToy<T>
where
    T: Send,
{
    /// Build a pool of `resolve_max_pool(max_pool)` items.
    ///
    /// ## Arguments
    /// * `max_pool` - override the maximum pool size, see [`resolve_max_pool`].
    /// * `init` - builds each item.
    pub fn from_fn<F>(
        max_pool: Option<NonZeroUsize>,
        init: F,
    ) -> Self
    where
        F: FnMut() -> T,
    {
        let size = resolve_max_pool(max_pool).max(1);
        let mut init = init;
        Self {
            pool: (0..size).map(|_| init()).collect(),
        }
    }

    /// Get a reference to the item for the current thread.
    pub fn get(&self) -> &T {
        let tid = current_thread_slot_hash();
        &self.pool[tid % self.pool.len()]
    }

    /// Get the length of the pool.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.pool.len()
    }
}

impl<T> Debug for PoolToy<T>
where
    T: Send,
{
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("PoolToy")
            .field("len", &self.pool.len())
            .finish()
    }
}
