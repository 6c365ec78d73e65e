use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Provider callback kinds accepted at the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookSource {
    VoiceInbound,
    VoiceStatus,
    Recording,
    SmsInbound,
    SmsStatus,
    Billing,
    Carrier,
}

impl WebhookSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VoiceInbound => "voice_inbound",
            Self::VoiceStatus => "voice_status",
            Self::Recording => "recording",
            Self::SmsInbound => "sms_inbound",
            Self::SmsStatus => "sms_status",
            Self::Billing => "billing",
            Self::Carrier => "carrier",
        }
    }

    /// Whether this callback reports on an existing call/message rather than
    /// starting a new one
    pub fn is_status_callback(&self) -> bool {
        matches!(self, Self::VoiceStatus | Self::SmsStatus | Self::Recording)
    }
}

impl fmt::Display for WebhookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A webhook whose signature has been verified
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub source: WebhookSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl WebhookEvent {
    pub fn new(source: WebhookSource, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            tenant_id: None,
            params: BTreeMap::new(),
            body: String::new(),
            received_at,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body = String::from_utf8_lossy(body).into_owned();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_callbacks() {
        assert!(WebhookSource::VoiceStatus.is_status_callback());
        assert!(WebhookSource::Recording.is_status_callback());
        assert!(!WebhookSource::SmsInbound.is_status_callback());
        assert!(!WebhookSource::Billing.is_status_callback());
    }

    #[test]
    fn test_event_serialization_skips_empty_fields() {
        let event = WebhookEvent::new(WebhookSource::SmsInbound, Utc::now());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["source"], "sms_inbound");
        assert!(json.get("tenant_id").is_none());
        assert!(json.get("body").is_none());
    }
}
