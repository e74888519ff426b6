//! Process-local memoization table.
//!
//! The registry memoizes its answers keyed by the rendered call signature
//! (`scan(true)`, `get(Blog)`, `get()`). Keys are never overwritten: once a
//! value is stored, every later read observes the same value until
//! [`MemoCache::clear`] is called.

use parking_lot::RwLock;
use std::collections::HashMap;

pub struct MemoCache<V: Clone> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Clone> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> MemoCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// The computation runs without holding the lock so it may consult other
    /// caches. If two callers race, the first stored value wins and both
    /// observe it. Errors are not cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let value = compute()?;
        let mut entries = self.entries.write();
        Ok(entries.entry(key.to_string()).or_insert(value).clone())
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
