//! Domain layer - Core types and ports

pub mod clock;
pub mod error;
pub mod outbound;
pub mod rate_limit;
pub mod signature;
pub mod webhook;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use error::DomainError;
pub use outbound::{
    BulkMessageRequest, DispatchReceipt, OutboundDispatcher, OutboundKind, PlaceCallRequest,
    SendMessageRequest,
};
pub use rate_limit::{
    CounterSnapshot, CounterStore, PresetLimit, RateLimitConfig, RateLimitPresets,
    RateLimitResult, RateLimitTier,
};
pub use signature::SignedRequest;
pub use webhook::{TenantSecret, TenantSecretStore, WebhookEvent, WebhookEventSink, WebhookSource};
