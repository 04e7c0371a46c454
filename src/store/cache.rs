//! Query Cache
//!
//! Memoizes gateway calls by (operation, normalized arguments) with a fixed
//! time-to-live. Entries are immutable once stored until they expire or an
//! explicit refresh drops everything. One interactive user per deployment is
//! the expected load, so duplicate concurrent fills of the same key are
//! tolerated; a multi-tenant deployment would want per-key locking here.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Process-wide result cache for remote store queries
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<String, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for (operation, arg), or run `producer` and
    /// store its result with a fresh timestamp. Values round-trip through
    /// JSON so one map serves every query shape.
    pub async fn cached<T, F, Fut>(&self, operation: &str, arg: &str, ttl: Duration, producer: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = format!("{}:{}", operation, arg);

        if let Some(hit) = self.lookup(&key, ttl) {
            return hit;
        }

        let value = producer().await;
        if let Ok(json) = serde_json::to_value(&value) {
            self.entries.insert(
                key,
                CacheEntry {
                    value: json,
                    stored_at: Instant::now(),
                },
            );
        }
        value
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() > ttl {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Drop every entry unconditionally; the next read of any key refills it
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_producer_runs_once_within_ttl() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let got: Vec<String> = cache
                .cached("students", "mentor@example.com", TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    vec!["Jane Doe".to_string()]
                })
                .await;
            assert_eq!(got, vec!["Jane Doe".to_string()]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refill() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        let produce = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            42u32
        };

        let _: u32 = cache.cached("count", "x", TTL, produce).await;
        cache.invalidate_all();
        assert_eq!(cache.len(), 0);
        let _: u32 = cache.cached("count", "x", TTL, produce).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_refills() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        let produce = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            "v".to_string()
        };

        let _: String = cache.cached("op", "a", Duration::ZERO, produce).await;
        let _: String = cache.cached("op", "a", Duration::ZERO, produce).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_isolated_per_argument() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for arg in ["a@example.com", "b@example.com", "a@example.com"] {
            let _: String = cache
                .cached("mentor", arg, TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    arg.to_uppercase()
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
