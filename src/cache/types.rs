//! Result and statistics types for the caching decorators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a read-through call.
///
/// A hit hands back the stored string untouched; there is no conversion back
/// to `T`. A miss hands back the freshly computed value itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead<T> {
    /// Served from the store
    Hit(String),
    /// Computed by the wrapped function and written to the store
    Computed(T),
}

impl<T> CacheRead<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheRead::Hit(_))
    }

    /// The computed value, if this call was a miss
    pub fn computed(self) -> Option<T> {
        match self {
            CacheRead::Hit(_) => None,
            CacheRead::Computed(value) => Some(value),
        }
    }
}

impl<T: ToString> CacheRead<T> {
    /// String form of the result, the same representation the store holds
    pub fn into_string(self) -> String {
        match self {
            CacheRead::Hit(value) => value,
            CacheRead::Computed(value) => value.to_string(),
        }
    }
}

/// Per-wrapper counters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from the store
    pub hits: u64,

    /// Reads that had to call the wrapped function
    pub misses: u64,

    /// Forced refreshes written by `cache_update`
    pub updates: u64,

    /// Namespace clears issued by `cache_clear`
    pub clears: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, updates: {}, clears: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.updates,
            self.clears
        )
    }
}

/// Lock-free counters behind a wrapper's `stats()`
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    updates: AtomicU64,
    clears: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}
