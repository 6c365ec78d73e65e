//! Application state shared by every handler

use std::sync::Arc;

use crate::config::WebhookConfig;
use crate::domain::{Clock, OutboundDispatcher, RateLimitPresets, WebhookEventSink};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::secrets::TenantSecretResolver;
use crate::infrastructure::signature::Verifier;

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub presets: Arc<RateLimitPresets>,
    /// Counter key namespace
    pub rate_limit_prefix: Arc<str>,
    pub secrets: Arc<TenantSecretResolver>,
    pub webhooks: Arc<WebhookConfig>,
    /// Present only when a billing signing secret is configured
    pub billing_verifier: Option<Arc<Verifier>>,
    /// Present only when a carrier public key is configured
    pub carrier_verifier: Option<Arc<Verifier>>,
    pub sink: Arc<dyn WebhookEventSink>,
    pub dispatcher: Arc<dyn OutboundDispatcher>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn prefix(&self) -> &str {
        &self.rate_limit_prefix
    }
}
