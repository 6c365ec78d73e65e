//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, BillingWebhookConfig, CarrierWebhookConfig, LogFormat, RateLimitSettings,
    SecurityConfig, ServerConfig, StoreConfig, WebhookConfig,
};
