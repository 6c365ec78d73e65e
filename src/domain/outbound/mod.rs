//! Outbound domain - send requests and the dispatcher port

mod dispatcher;
mod request;

pub use dispatcher::{DispatchReceipt, OutboundDispatcher, OutboundKind};
pub use request::{BulkMessageRequest, PlaceCallRequest, SendMessageRequest, is_e164};

#[cfg(test)]
pub use dispatcher::MockOutboundDispatcher;
