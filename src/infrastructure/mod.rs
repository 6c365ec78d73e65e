//! Infrastructure layer - Adapters for the domain ports

pub mod counter_store;
pub mod logging;
pub mod observability;
pub mod outbound;
pub mod rate_limit;
pub mod secrets;
pub mod signature;
pub mod webhook;
