//! In-memory counter store using moka

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use moka::ops::compute::{CompResult, Op};

use crate::domain::{Clock, CounterStore, DomainError, SystemClock};

/// Counter value with its expiry instant
#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: u64,
    expires_at: Option<DateTime<Utc>>,
}

impl CounterEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local counter store.
///
/// Honours the same contract as the Redis store (atomic per-key increment,
/// TTL set only through `expire`), but limits hold per process only. Expiry is
/// evaluated against the injected clock.
#[derive(Clone)]
pub struct InMemoryCounterStore {
    cache: MokaCache<String, CounterEntry>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for InMemoryCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCounterStore")
            .field("entries", &self.cache.entry_count())
            .field("clock", &self.clock)
            .finish()
    }
}

impl InMemoryCounterStore {
    /// Creates a store bounded to `max_keys` counters
    pub fn new(max_keys: u64) -> Self {
        Self::with_clock(max_keys, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(max_keys: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: MokaCache::builder().max_capacity(max_keys).build(),
            clock,
        }
    }

    async fn live_entry(&self, key: &str) -> Option<CounterEntry> {
        let entry = self.cache.get(key).await?;

        if entry.is_expired(self.clock.now()) {
            self.cache.invalidate(key).await;
            return None;
        }

        Some(entry)
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new(100_000)
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError> {
        let now = self.clock.now();

        Ok(self
            .live_entry(key)
            .await
            .and_then(|entry| entry.expires_at)
            .map(|at| {
                let millis = (at - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000)
            }))
    }

    async fn incr(&self, key: &str) -> Result<u64, DomainError> {
        let now = self.clock.now();

        let entry = self
            .cache
            .entry_by_ref(key)
            .and_upsert_with(|existing| {
                let next = match existing.map(|e| e.into_value()) {
                    Some(current) if !current.is_expired(now) => CounterEntry {
                        value: current.value + 1,
                        expires_at: current.expires_at,
                    },
                    _ => CounterEntry {
                        value: 1,
                        expires_at: None,
                    },
                };
                std::future::ready(next)
            })
            .await;

        Ok(entry.into_value().value)
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let expires_at = now + chrono::Duration::seconds(seconds as i64);

        let result = self
            .cache
            .entry_by_ref(key)
            .and_compute_with(|existing| {
                let op = match existing.map(|e| e.into_value()) {
                    Some(current) if !current.is_expired(now) => Op::Put(CounterEntry {
                        value: current.value,
                        expires_at: Some(expires_at),
                    }),
                    Some(_) => Op::Remove,
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ManualClock;

    fn store_with_clock() -> (InMemoryCounterStore, ManualClock) {
        let clock = ManualClock::at_unix(1_700_000_000);
        let store = InMemoryCounterStore::with_clock(1_000, Arc::new(clock.clone()));
        (store, clock)
    }

    #[tokio::test]
    async fn test_missing_key_reads_as_none() {
        let (store, _) = store_with_clock();

        assert_eq!(store.get("missing").await.unwrap(), None);
        assert_eq!(store.ttl("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_creates_and_increments() {
        let (store, _) = store_with_clock();

        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.get("counter").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_incr_does_not_refresh_ttl() {
        let (store, clock) = store_with_clock();

        store.incr("counter").await.unwrap();
        assert!(store.expire("counter", 60).await.unwrap());

        clock.advance(Duration::from_secs(20));
        store.incr("counter").await.unwrap();

        assert_eq!(store.ttl("counter").await.unwrap(), Some(40));
    }

    #[tokio::test]
    async fn test_counter_expires() {
        let (store, clock) = store_with_clock();

        store.increment("counter", Some(60)).await.unwrap();
        clock.advance(Duration::from_secs(60));

        assert_eq!(store.get("counter").await.unwrap(), None);
        assert_eq!(store.incr("counter").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_on_missing_key_is_false() {
        let (store, _) = store_with_clock();

        assert!(!store.expire("missing", 60).await.unwrap());
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_reads_value_and_ttl() {
        let (store, _) = store_with_clock();

        store.increment("counter", Some(30)).await.unwrap();
        let snapshot = store.snapshot("counter").await.unwrap();

        assert_eq!(snapshot.count, Some(1));
        assert_eq!(snapshot.ttl_secs, Some(30));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryCounterStore::default());

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.incr("shared").await.unwrap() })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get("shared").await.unwrap(), Some(50));
    }
}
