use async_trait::async_trait;
use tracing::info;

use crate::domain::{
    BulkMessageRequest, DispatchReceipt, DomainError, OutboundDispatcher, OutboundKind,
    PlaceCallRequest, SendMessageRequest,
};

/// Dispatcher that acknowledges admitted sends and logs them.
///
/// Provider delivery is owned by the CRM's orchestration; this adapter lets
/// the edge run standalone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

impl LoggingDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutboundDispatcher for LoggingDispatcher {
    async fn send_message(
        &self,
        tenant_id: &str,
        request: SendMessageRequest,
    ) -> Result<DispatchReceipt, DomainError> {
        let receipt = DispatchReceipt::queued(OutboundKind::Message);
        info!(
            dispatch_id = %receipt.id,
            tenant_id,
            body_chars = request.body.chars().count(),
            "outbound_message_queued"
        );
        Ok(receipt)
    }

    async fn place_call(
        &self,
        tenant_id: &str,
        request: PlaceCallRequest,
    ) -> Result<DispatchReceipt, DomainError> {
        let receipt = DispatchReceipt::queued(OutboundKind::Call);
        info!(
            dispatch_id = %receipt.id,
            tenant_id,
            has_caller_id = request.from.is_some(),
            "outbound_call_queued"
        );
        Ok(receipt)
    }

    async fn send_bulk(
        &self,
        tenant_id: &str,
        request: BulkMessageRequest,
    ) -> Result<DispatchReceipt, DomainError> {
        let receipt = DispatchReceipt::queued(OutboundKind::BulkMessage);
        info!(
            dispatch_id = %receipt.id,
            tenant_id,
            recipients = request.to.len(),
            "outbound_bulk_queued"
        );
        Ok(receipt)
    }
}
