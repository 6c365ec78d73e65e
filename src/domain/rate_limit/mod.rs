//! Rate limit domain - budgets, decisions and the shared counter store port

mod config;
mod presets;
mod result;
mod store;

pub use config::{RateLimitConfig, RateLimitTier};
pub use presets::{PresetLimit, RateLimitPresets};
pub use result::RateLimitResult;
pub use store::{CounterSnapshot, CounterStore};

#[cfg(test)]
pub use store::MockCounterStore;
