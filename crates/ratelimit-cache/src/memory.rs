//! An in-process counter store, used as a test double for the engine and
//! HTTP layer and, optionally, as a local/dev-mode stand-in for Redis. It
//! replicates `incr_and_expire`/`ttl`/`get` semantics, including the `-1`
//! and `-2` TTL sentinels, without requiring a live Redis connection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use ratelimit_core::Result;

use crate::backend::CounterStore;

struct Entry {
    value: i64,
    expiry: Option<Instant>,
}

/// A `Mutex<HashMap>`-backed counter store. Entries are evicted lazily, on
/// the next operation that touches them, mirroring the way an external
/// TTL-based store "destroys" keys only from the caller's point of view.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn evict_if_expired(entries: &mut HashMap<String, Entry>, key: &str) {
        let expired = entries
            .get(key)
            .and_then(|e| e.expiry)
            .is_some_and(|exp| Instant::now() >= exp);
        if expired {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_and_expire(&self, key: &str, ttl_seconds: u32) -> Result<i64> {
        let mut entries = self.entries.lock();
        Self::evict_if_expired(&mut entries, key);
        let entry = entries.entry(key.to_string()).or_insert(Entry {
            value: 0,
            expiry: None,
        });
        entry.value += 1;
        if entry.value == 1 {
            entry.expiry = Some(Instant::now() + Duration::from_secs(ttl_seconds as u64));
        }
        Ok(entry.value)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock();
        Self::evict_if_expired(&mut entries, key);
        match entries.get(key) {
            None => Ok(-2),
            Some(Entry { expiry: None, .. }) => Ok(-1),
            Some(Entry {
                expiry: Some(exp), ..
            }) => {
                let remaining = exp.saturating_duration_since(Instant::now());
                Ok(remaining.as_secs() as i64)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut entries = self.entries.lock();
        Self::evict_if_expired(&mut entries, key);
        Ok(entries.get(key).map(|e| e.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_increment_sets_ttl() {
        let store = MemoryCounterStore::new();
        let count = store.incr_and_expire("rate_limit:u1:0", 60).await.unwrap();
        assert_eq!(count, 1);
        let ttl = store.ttl("rate_limit:u1:0").await.unwrap();
        assert!((0..=60).contains(&ttl));
    }

    #[tokio::test]
    async fn subsequent_increments_do_not_reset_ttl() {
        let store = MemoryCounterStore::new();
        store.incr_and_expire("k", 60).await.unwrap();
        let ttl_before = store.ttl("k").await.unwrap();
        let count = store.incr_and_expire("k", 60).await.unwrap();
        assert_eq!(count, 2);
        let ttl_after = store.ttl("k").await.unwrap();
        assert!(ttl_after <= ttl_before);
    }

    #[tokio::test]
    async fn absent_key_reports_sentinel_negative_two() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.ttl("missing").await.unwrap(), -2);
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_key_is_treated_as_absent() {
        let store = MemoryCounterStore::new();
        store.incr_and_expire("k", 0).await.unwrap();
        // ttl_seconds = 0 means the entry's expiry instant is effectively now.
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.ttl("k").await.unwrap(), -2);
    }

    #[tokio::test]
    async fn get_returns_the_current_count_without_mutating() {
        let store = MemoryCounterStore::new();
        store.incr_and_expire("k", 60).await.unwrap();
        store.incr_and_expire("k", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(2));
        assert_eq!(store.get("k").await.unwrap(), Some(2));
    }
}
