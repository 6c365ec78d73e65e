//! Redis counter store
//!
//! Reads (`GET` + `TTL`) and writes (`INCR` + `EXPIRE`) are each sent as one
//! pipeline so a check costs two round trips. Every command is bounded by the
//! configured timeout; a timeout surfaces as a store error like any other.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::{CounterSnapshot, CounterStore, DomainError};

/// Configuration for the Redis counter store
#[derive(Debug, Clone)]
pub struct RedisCounterStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Upper bound for connecting and for each command or pipeline
    pub command_timeout: Duration,
}

impl Default for RedisCounterStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            command_timeout: Duration::from_millis(500),
        }
    }
}

impl RedisCounterStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Redis-backed counter store.
///
/// The connection is established on first use, so the service starts (and
/// the limiter applies its failure policy) even while Redis is down.
pub struct RedisCounterStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCounterStoreConfig,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCounterStore {
    /// Validates the URL; does not connect
    pub fn new(config: RedisCounterStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let manager = tokio::time::timeout(
                    self.config.command_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                .map_err(|_| DomainError::store("Timed out connecting to Redis"))?
                .map_err(|e| DomainError::store(format!("Failed to connect to Redis: {}", e)))?;

                info!(url = %redact_url(&self.config.url), "redis_counter_store_connected");
                Ok::<_, DomainError>(manager)
            })
            .await?;

        Ok(connection.clone())
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        key: &str,
        future: impl Future<Output = RedisResult<T>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.config.command_timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DomainError::store(format!(
                "Failed to {} key '{}': {}",
                operation, key, e
            ))),
            Err(_) => Err(DomainError::store(format!(
                "Timed out after {:?} trying to {} key '{}'",
                self.config.command_timeout, operation, key
            ))),
        }
    }
}

/// Redis reports -2 for a missing key and -1 for a key without expiry
fn ttl_from_reply(reply: i64) -> Option<u64> {
    (reply >= 0).then_some(reply as u64)
}

fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, DomainError> {
        let mut conn = self.connection().await?;
        self.bounded("get", key, conn.get(key)).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError> {
        let mut conn = self.connection().await?;
        let reply: i64 = self.bounded("read TTL of", key, conn.ttl(key)).await?;

        Ok(ttl_from_reply(reply))
    }

    async fn incr(&self, key: &str) -> Result<u64, DomainError> {
        let mut conn = self.connection().await?;
        self.bounded("increment", key, conn.incr(key, 1u64)).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;
        self.bounded("expire", key, conn.expire(key, seconds as i64))
            .await
    }

    async fn snapshot(&self, key: &str) -> Result<CounterSnapshot, DomainError> {
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.get(key).ttl(key);

        let (count, ttl): (Option<u64>, i64) = self
            .bounded("read", key, pipe.query_async(&mut conn))
            .await?;

        Ok(CounterSnapshot {
            count,
            ttl_secs: ttl_from_reply(ttl),
        })
    }

    async fn increment(&self, key: &str, expire_secs: Option<u64>) -> Result<u64, DomainError> {
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic().incr(key, 1u64);

        if let Some(seconds) = expire_secs {
            pipe.expire(key, seconds as i64).ignore();
        }

        let (value,): (u64,) = self
            .bounded("increment", key, pipe.query_async(&mut conn))
            .await?;

        Ok(value)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
