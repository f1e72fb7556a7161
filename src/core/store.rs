//! Key/value storage for resolved bodies, with per-entry expiry.

use crate::core::ResponseBody;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Storage backing a [`CachedFetch`](crate::CachedFetch).
///
/// Implementations own expiry: `get` must never return an entry whose validity
/// window has elapsed. Writes are last-writer-wins.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// The stored body for `key`, if present and not expired.
    fn get(&self, key: &str) -> Option<ResponseBody>;

    /// Store `value` under `key`, usable for `valid_for` from now.
    fn put(&self, key: &str, value: ResponseBody, valid_for: Duration);

    /// Keys currently held.
    fn keys(&self) -> Vec<String>;

    /// Drop the entry for `key`, if any.
    fn remove(&self, key: &str);

    /// Drop every entry.
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ResponseBody,
    created_at: Instant,
    valid_for: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) <= self.valid_for
    }
}

/// The default in-process [`CacheStore`].
#[derive(Default)]
pub struct MemoryCache {
    map: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .finish()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<ResponseBody> {
        let now = Instant::now();
        {
            let guard = self.map.read().unwrap_or_else(PoisonError::into_inner);
            match guard.get(key) {
                Some(entry) if entry.is_fresh(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop it unless a concurrent put already replaced it.
        let mut guard = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if guard.get(key).is_some_and(|e| !e.is_fresh(now)) {
            guard.remove(key);
        }
        None
    }

    fn put(&self, key: &str, value: ResponseBody, valid_for: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            created_at: now,
            valid_for,
        };
        let mut guard = self.map.write().unwrap_or_else(PoisonError::into_inner);
        // Sweep entries whose keys may never be looked up again.
        guard.retain(|_, e| e.is_fresh(now));
        guard.insert(key.to_string(), entry);
    }

    fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let guard = self.map.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .filter(|(_, e)| e.is_fresh(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn remove(&self, key: &str) {
        let mut guard = self.map.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
    }

    fn clear(&self) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
