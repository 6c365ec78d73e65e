use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::{BulkMessageRequest, PlaceCallRequest, SendMessageRequest};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Kind of outbound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    Message,
    Call,
    BulkMessage,
}

/// Acknowledgement that an outbound operation was accepted for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub id: Uuid,
    pub kind: OutboundKind,
    pub status: &'static str,
}

impl DispatchReceipt {
    pub fn queued(kind: OutboundKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: "queued",
        }
    }
}

/// Call and message orchestration behind the outbound endpoints
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OutboundDispatcher: Send + Sync {
    async fn send_message(
        &self,
        tenant_id: &str,
        request: SendMessageRequest,
    ) -> Result<DispatchReceipt, DomainError>;

    async fn place_call(
        &self,
        tenant_id: &str,
        request: PlaceCallRequest,
    ) -> Result<DispatchReceipt, DomainError>;

    async fn send_bulk(
        &self,
        tenant_id: &str,
        request: BulkMessageRequest,
    ) -> Result<DispatchReceipt, DomainError>;
}
