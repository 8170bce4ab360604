use crate::domain::errors::AnalysisError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cache key: tool name plus its JSON-serialized arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tool: String,
    pub args: String,
}

impl CacheKey {
    /// Fails when `args` has no JSON form, so distinct keys never collapse.
    pub fn new<A: Serialize>(tool: &str, args: &A) -> Result<Self, AnalysisError> {
        let args = serde_json::to_string(args).map_err(|e| {
            AnalysisError::validation(format!("Cannot build cache key for {}: {}", tool, e))
        })?;
        Ok(Self {
            tool: tool.to_string(),
            args,
        })
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Time-to-live response cache shared across requests.
///
/// Concurrent inserts for the same key are last-write-wins. Expired entries
/// read as misses and are dropped by `purge_expired`.
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

// Manual Debug implementation for ResponseCache
impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let guard = match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };

        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(key, entry);
            }
            Err(poisoned) => {
                tracing::error!("ResponseCache: Lock poisoned during write, recovering");
                poisoned.into_inner().insert(key, entry);
            }
        }
    }

    /// Removes one entry; returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.write_guard().remove(key).is_some()
    }

    /// Removes every entry stored under `tool`; returns how many were dropped.
    pub fn invalidate_tool(&self, tool: &str) -> usize {
        let mut guard = self.write_guard();
        let before = guard.len();
        guard.retain(|key, _| key.tool != tool);
        before - guard.len()
    }

    pub fn clear(&self) {
        self.write_guard().clear();
    }

    /// Drops expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut guard = self.write_guard();
        let before = guard.len();
        guard.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - guard.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
