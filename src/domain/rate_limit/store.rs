//! Shared counter store port
//!
//! Any store offering atomic `GET`, `TTL`, `INCR` and `EXPIRE` satisfies this
//! contract. Adapters that can batch commands override [`CounterStore::snapshot`]
//! and [`CounterStore::increment`] to issue them in a single round trip.

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Counter value and remaining lifetime read together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Current value, `None` when the key does not exist
    pub count: Option<u64>,
    /// Remaining TTL in seconds, `None` when missing or without expiry
    pub ttl_secs: Option<u64>,
}

impl CounterSnapshot {
    pub fn exists(&self) -> bool {
        self.count.is_some()
    }

    /// Current value, treating a missing key as zero
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

/// Atomic counter store shared by every process instance
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Reads a counter value
    async fn get(&self, key: &str) -> Result<Option<u64>, DomainError>;

    /// Reads the remaining TTL of a counter in seconds
    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError>;

    /// Atomically increments a counter, creating it at 1 when missing
    async fn incr(&self, key: &str) -> Result<u64, DomainError>;

    /// Sets a counter's TTL; returns false when the key does not exist
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool, DomainError>;

    /// Reads value and TTL together
    async fn snapshot(&self, key: &str) -> Result<CounterSnapshot, DomainError> {
        let count = self.get(key).await?;
        let ttl_secs = self.ttl(key).await?;

        Ok(CounterSnapshot { count, ttl_secs })
    }

    /// Increments a counter and, when `expire_secs` is given, sets its TTL
    async fn increment(&self, key: &str, expire_secs: Option<u64>) -> Result<u64, DomainError> {
        let value = self.incr(key).await?;

        if let Some(seconds) = expire_secs {
            self.expire(key, seconds).await?;
        }

        Ok(value)
    }

    /// Backend name for logs and readiness output
    fn backend_name(&self) -> &'static str;
}
