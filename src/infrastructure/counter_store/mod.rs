//! Counter store adapters

mod factory;
mod in_memory;
mod redis;

pub use factory::{create_counter_store, CounterStoreConfig, StoreBackend};
pub use in_memory::InMemoryCounterStore;
pub use redis::{RedisCounterStore, RedisCounterStoreConfig};
