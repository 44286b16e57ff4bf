//! Memoization of parsed unit expressions

use std::{
    fmt,
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard, PoisonError},
};

use lru::LruCache;

use crate::parser::ParsedUnit;

/// A cache of parsed unit expressions, keyed by the expression text.
///
/// Parsing is deterministic, so a cache may evict or drop entries at any
/// time without changing results.
pub trait ParseCache: Send + Sync {
    /// Returns the cached parse of `expression`, if any.
    fn get(&self, expression: &str) -> Option<ParsedUnit>;

    /// Stores the parse of `expression`.
    fn insert(&self, expression: String, parsed: ParsedUnit);

    /// Returns the number of cached expressions.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every cached expression.
    fn clear(&self);
}

/// A bounded least-recently-used parse cache.
pub struct LruParseCache {
    entries: Mutex<LruCache<String, ParsedUnit>>,
}

impl LruParseCache {
    /// Creates a cache that holds at most `capacity` expressions.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the maximum number of cached expressions.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries().cap()
    }

    // entries are inserted whole, so a poisoned cache is still consistent
    fn entries(&self) -> MutexGuard<'_, LruCache<String, ParsedUnit>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ParseCache for LruParseCache {
    fn get(&self, expression: &str) -> Option<ParsedUnit> {
        self.entries().get(expression).cloned()
    }

    fn insert(&self, expression: String, parsed: ParsedUnit) {
        self.entries().put(expression, parsed);
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

impl fmt::Debug for LruParseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        f.debug_struct("LruParseCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
