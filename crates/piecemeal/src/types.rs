//! # Common Types and Traits
use core::{
    fmt::{Debug, Display},
    hash::Hash,
};

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

/// A type that can be used as a token id.
///
/// These are constrained to be unsigned primitive integers;
/// such that the max token in a vocabulary is less than `T::max()`.
pub trait TokenType:
    'static
    + PrimInt
    + FromPrimitive
    + ToPrimitive
    + Unsigned
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
{
}

impl<T> TokenType for T where
    T: 'static
        + PrimInt
        + FromPrimitive
        + ToPrimitive
        + Unsigned
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
{
}

/// A pair of tokens.
pub type Pair<T> = (T, T);

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type PMHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> PMHashMap<K, V> {
            PMHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type PMHashSet<V> = ahash::AHashSet<V>;

    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type PMHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> PMHashMap<K, V> {
            foldhash::HashMapExt::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type PMHashSet<V> = foldhash::HashSet<V>;

    } else {
        /// Type Alias for hash maps in this crate.
        pub type PMHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> PMHashMap<K, V> {
            PMHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type PMHashSet<V> = std::collections::HashSet<V>;
    }
}

/// Convert a `usize` into a token, failing if it does not fit.
pub fn try_token_from_usize<T: TokenType>(value: usize) -> crate::PMResult<T> {
    T::from_usize(value).ok_or(crate::PiecemealError::TokenOutOfRange { value })
}

/// Static check that a type is `Send` and `Sync`.
pub fn static_is_send_sync_check<S: Send + Sync>(_: &S) {}
