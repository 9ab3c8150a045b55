//! # Encode Cache
//!
//! An LRU map from raw text to its shared content encoding, bounded by
//! both entry count and approximate total bytes.

use core::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{PMResult, PiecemealError, TokenType, encoders::EncodedExample};

/// The default maximum number of cached entries.
pub const DEFAULT_CACHE_ENTRIES: usize = 4096;

/// The default maximum cached bytes.
pub const DEFAULT_CACHE_BYTES: usize = 64 << 20;

/// Bounds for an [`EncodeCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptions {
    /// The maximum number of entries.
    pub max_entries: NonZeroUsize,

    /// The maximum total of key and value bytes.
    pub max_bytes: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_entries: NonZeroUsize::new(DEFAULT_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
            max_bytes: DEFAULT_CACHE_BYTES,
        }
    }
}

impl CacheOptions {
    /// Create cache options.
    ///
    /// ## Returns
    /// A [`PiecemealError::Configuration`] if `max_entries` is zero.
    pub fn new(
        max_entries: usize,
        max_bytes: usize,
    ) -> PMResult<Self> {
        let max_entries = NonZeroUsize::new(max_entries)
            .ok_or_else(|| PiecemealError::config("cache max_entries must be positive"))?;
        Ok(Self {
            max_entries,
            max_bytes,
        })
    }

    /// Get the maximum number of entries.
    pub fn max_entries(&self) -> NonZeroUsize {
        self.max_entries
    }

    /// Get the maximum total bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Set the maximum total bytes, and return the options.
    pub fn with_max_bytes(
        mut self,
        max_bytes: usize,
    ) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// A point-in-time view of cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries.
    pub entries: usize,
    /// Approximate live bytes.
    pub bytes: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that fell through.
    pub misses: u64,
}

struct CacheState<T: TokenType> {
    lru: LruCache<String, Arc<EncodedExample<T>>>,
    bytes: usize,
    hits: u64,
    misses: u64,
}

fn entry_bytes<T: TokenType>(
    text: &str,
    value: &EncodedExample<T>,
) -> usize {
    text.len() + value.heap_size()
}

/// A thread-safe, bounded LRU cache of content encodings.
///
/// Values are immutable once inserted; readers share them through `Arc`.
pub struct EncodeCache<T: TokenType> {
    options: CacheOptions,
    state: Mutex<CacheState<T>>,
}

impl<T: TokenType> core::fmt::Debug for EncodeCache<T> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("EncodeCache")
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T: TokenType> EncodeCache<T> {
    /// Create an empty cache.
    pub fn new(options: CacheOptions) -> Self {
        log::debug!(
            "encode cache: max_entries={}, max_bytes={}",
            options.max_entries,
            options.max_bytes
        );
        Self {
            options,
            state: Mutex::new(CacheState {
                lru: LruCache::new(options.max_entries),
                bytes: 0,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// The cache bounds.
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Look up the encoding of `text`, marking it recently used.
    pub fn get(
        &self,
        text: &str,
    ) -> Option<Arc<EncodedExample<T>>> {
        let mut state = self.state.lock();
        match state.lru.get(text).cloned() {
            Some(value) => {
                state.hits += 1;
                Some(value)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Insert an encoding, evicting least recently used entries to fit.
    ///
    /// Entries larger than the whole byte budget are not cached.
    pub fn insert(
        &self,
        text: &str,
        value: Arc<EncodedExample<T>>,
    ) {
        let size = entry_bytes(text, &value);
        if size > self.options.max_bytes {
            return;
        }

        let mut state = self.state.lock();
        state.bytes += size;
        if let Some((old_text, old_value)) = state.lru.push(text.to_string(), value) {
            state.bytes -= entry_bytes(&old_text, &old_value);
        }
        while state.bytes > self.options.max_bytes {
            match state.lru.pop_lru() {
                Some((old_text, old_value)) => {
                    state.bytes -= entry_bytes(&old_text, &old_value);
                }
                None => break,
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.lru.clear();
        state.bytes = 0;
    }

    /// Current usage.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.lru.len(),
            bytes: state.bytes,
            hits: state.hits,
            misses: state.misses,
        }
    }
}
