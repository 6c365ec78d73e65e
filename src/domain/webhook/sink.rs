use async_trait::async_trait;

use super::WebhookEvent;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Consumer of verified webhook events.
///
/// Call/message record creation and status updates live behind this port;
/// nothing reaches it unless the request passed rate limiting and signature
/// verification.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebhookEventSink: Send + Sync {
    async fn deliver(&self, event: WebhookEvent) -> Result<(), DomainError>;
}
