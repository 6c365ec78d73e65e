use async_trait::async_trait;
use tracing::info;

use crate::domain::{DomainError, WebhookEvent, WebhookEventSink};

/// Sink that records verified events in the structured log.
///
/// Stands in for the CRM's call/message processing when the edge runs on its
/// own; parameter values are not logged since they carry caller content.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookEventSink for LoggingEventSink {
    async fn deliver(&self, event: WebhookEvent) -> Result<(), DomainError> {
        let call_sid = event
            .params
            .get("CallSid")
            .or_else(|| event.params.get("MessageSid"))
            .map(String::as_str)
            .unwrap_or("-");

        info!(
            event_id = %event.id,
            source = %event.source,
            tenant_id = event.tenant_id.as_deref().unwrap_or("-"),
            resource_sid = call_sid,
            param_count = event.params.len(),
            body_bytes = event.body.len(),
            received_at = %event.received_at,
            "webhook_event_accepted"
        );

        Ok(())
    }
}
