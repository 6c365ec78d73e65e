//! Webhook domain - inbound provider events, their consumer, and tenant secrets

mod event;
mod sink;
mod tenant;

pub use event::{WebhookEvent, WebhookSource};
pub use sink::WebhookEventSink;
pub use tenant::{TenantSecret, TenantSecretStore};

#[cfg(test)]
pub use sink::MockWebhookEventSink;
#[cfg(test)]
pub use tenant::MockTenantSecretStore;
