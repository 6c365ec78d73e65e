//! Preset budgets for the common call sites
//!
//! Outbound sends are limited per tenant because each send costs money or
//! sender reputation. Inbound webhooks are limited per source and sized for
//! provider retries. Authentication attempts are limited per client IP.

use serde::Deserialize;

use super::config::{RateLimitConfig, RateLimitTier};
use crate::domain::DomainError;

/// Limit and window for one preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PresetLimit {
    pub limit: u64,
    pub window_secs: u64,
    /// Overrides the limiter-wide failure policy when set
    #[serde(default)]
    pub fail_open: Option<bool>,
}

impl PresetLimit {
    pub const fn new(limit: u64, window_secs: u64) -> Self {
        Self {
            limit,
            window_secs,
            fail_open: None,
        }
    }

    pub const fn failing_closed(mut self) -> Self {
        self.fail_open = Some(false);
        self
    }

    fn config(&self, identifier: String, prefix: &str) -> Result<RateLimitConfig, DomainError> {
        Ok(RateLimitConfig::new(identifier, self.limit, self.window_secs, prefix)?
            .with_fail_open_override(self.fail_open))
    }
}

/// Preset table, overridable from configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitPresets {
    pub sms_send: PresetLimit,
    pub call_initiate: PresetLimit,
    pub webhook_inbound: PresetLimit,
    pub webhook_status: PresetLimit,
    pub auth_attempt: PresetLimit,
    pub bulk_send: Vec<RateLimitTier>,
}

impl Default for RateLimitPresets {
    fn default() -> Self {
        Self {
            sms_send: PresetLimit::new(10, 60),
            // Call origination is the toll-fraud vector: deny when the store is down.
            call_initiate: PresetLimit::new(5, 60).failing_closed(),
            webhook_inbound: PresetLimit::new(100, 60),
            webhook_status: PresetLimit::new(300, 60),
            auth_attempt: PresetLimit::new(5, 300),
            bulk_send: vec![
                RateLimitTier::per_second(1),
                RateLimitTier::per_minute(30),
                RateLimitTier::per_hour(500),
            ],
        }
    }
}

impl RateLimitPresets {
    /// Outbound SMS, per tenant
    pub fn sms_send(&self, tenant_id: &str, prefix: &str) -> Result<RateLimitConfig, DomainError> {
        self.sms_send
            .config(format!("tenant:{}:sms:send", tenant_id), prefix)
    }

    /// Outbound voice call origination, per tenant
    pub fn call_initiate(
        &self,
        tenant_id: &str,
        prefix: &str,
    ) -> Result<RateLimitConfig, DomainError> {
        self.call_initiate
            .config(format!("tenant:{}:call:initiate", tenant_id), prefix)
    }

    /// Inbound call/message webhooks, per source phone number or host
    pub fn webhook_inbound(
        &self,
        source: &str,
        prefix: &str,
    ) -> Result<RateLimitConfig, DomainError> {
        self.webhook_inbound
            .config(format!("webhook:{}", source), prefix)
    }

    /// Status and recording callbacks, per provider account
    pub fn webhook_status(
        &self,
        source: &str,
        prefix: &str,
    ) -> Result<RateLimitConfig, DomainError> {
        self.webhook_status
            .config(format!("webhook:status:{}", source), prefix)
    }

    /// Authentication attempts, per client IP
    pub fn auth_attempt(&self, ip: &str, prefix: &str) -> Result<RateLimitConfig, DomainError> {
        self.auth_attempt.config(format!("auth:{}", ip), prefix)
    }

    /// Identifier shared by all bulk-send tiers of a tenant
    pub fn bulk_send_identifier(tenant_id: &str) -> String {
        format!("tenant:{}:bulk", tenant_id)
    }

    pub fn bulk_send_tiers(&self) -> &[RateLimitTier] {
        &self.bulk_send
    }

    /// Builds every preset once so a zero limit or window is caught at startup
    /// instead of on each request
    pub fn validate(&self, prefix: &str) -> Result<(), DomainError> {
        let presets = [
            ("sms_send", &self.sms_send),
            ("call_initiate", &self.call_initiate),
            ("webhook_inbound", &self.webhook_inbound),
            ("webhook_status", &self.webhook_status),
            ("auth_attempt", &self.auth_attempt),
        ];

        for (name, preset) in presets {
            preset
                .config(format!("preset:{}", name), prefix)
                .map_err(|e| invalid_preset(&format!("rate_limit.presets.{}", name), e))?;
        }

        for (index, tier) in self.bulk_send.iter().enumerate() {
            tier.to_config("preset:bulk_send", index, prefix).map_err(|e| {
                invalid_preset(&format!("rate_limit.presets.bulk_send[{}]", index), e)
            })?;
        }

        Ok(())
    }
}

fn invalid_preset(path: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Validation { message } => {
            DomainError::configuration(format!("Invalid {}: {}", path, message))
        }
        other => other,
    }
}
