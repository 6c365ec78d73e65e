//! Counter store factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{Clock, CounterStore, DomainError};

use super::in_memory::InMemoryCounterStore;
use super::redis::{RedisCounterStore, RedisCounterStoreConfig};

/// Supported counter store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store; limits are not shared between instances
    #[default]
    Memory,
    /// Shared Redis store
    Redis,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Redis => write!(f, "redis"),
        }
    }
}

/// Configuration for the counter store factory
#[derive(Debug, Clone)]
pub struct CounterStoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    pub command_timeout: Duration,
    pub max_keys: u64,
}

impl Default for CounterStoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            command_timeout: Duration::from_millis(500),
            max_keys: 100_000,
        }
    }
}

/// Creates the configured counter store
pub fn create_counter_store(
    config: &CounterStoreConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn CounterStore>, DomainError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryCounterStore::with_clock(
            config.max_keys,
            clock,
        ))),
        StoreBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                DomainError::configuration("Redis URL is required for the redis counter store")
            })?;

            let store = RedisCounterStore::new(
                RedisCounterStoreConfig::new(url).with_command_timeout(config.command_timeout),
            )?;

            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SystemClock;

    #[test]
    fn test_default_backend_is_memory() {
        let store = create_counter_store(&CounterStoreConfig::default(), Arc::new(SystemClock))
            .unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_redis_requires_url() {
        let config = CounterStoreConfig {
            backend: StoreBackend::Redis,
            ..Default::default()
        };

        let result = create_counter_store(&config, Arc::new(SystemClock));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_redis_backend_does_not_connect_eagerly() {
        let config = CounterStoreConfig {
            backend: StoreBackend::Redis,
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            ..Default::default()
        };

        let store = create_counter_store(&config, Arc::new(SystemClock)).unwrap();
        assert_eq!(store.backend_name(), "redis");
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: StoreBackend = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(backend, StoreBackend::Redis);
        assert_eq!(backend.to_string(), "redis");
    }
}
