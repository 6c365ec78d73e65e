//! Webhook Guard
//!
//! Edge protection for a telephony CRM:
//! - Fixed-window rate limiting over a shared counter store (Redis or in-memory)
//! - Provider webhook signature verification (HMAC-SHA1, timestamped HMAC-SHA256, RSA)
//! - Encrypted per-tenant provider credentials

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{Clock, SystemClock};
use infrastructure::{
    counter_store::create_counter_store,
    outbound::LoggingDispatcher,
    rate_limit::RateLimiter,
    secrets::{ConfigTenantSecretStore, SecretCipher, TenantSecretResolver},
    signature::Verifier,
    webhook::LoggingEventSink,
};
use tracing::info;

/// Create the application state from default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let store = create_counter_store(&config.store.counter_store_config(), clock.clone())?;
    info!(
        backend = store.backend_name(),
        fail_open = config.rate_limit.fail_open,
        prefix = %config.rate_limit.prefix,
        "Counter store configured"
    );
    let limiter = RateLimiter::with_clock(store, clock.clone())
        .with_fail_open(config.rate_limit.fail_open);

    let cipher = config
        .security
        .encryption_key
        .as_deref()
        .map(SecretCipher::from_hex_key)
        .transpose()?;
    let secrets = TenantSecretResolver::new(
        Arc::new(ConfigTenantSecretStore::new(config.tenants.clone())),
        cipher,
        config.security.decrypt_fallback,
    );
    secrets.ensure_ready().await?;
    info!(tenants = config.tenants.len(), "Tenant secrets loaded");

    let billing = &config.webhooks.billing;
    let billing_verifier = billing.signing_secret.as_ref().map(|secret| {
        Arc::new(Verifier::hmac_timestamped(secret.clone()).with_tolerance(billing.tolerance_secs))
    });

    let carrier = &config.webhooks.carrier;
    let carrier_verifier = carrier
        .public_key_pem
        .as_deref()
        .map(|pem| {
            Verifier::rsa_timestamped_from_pem(pem)
                .map(|verifier| Arc::new(verifier.with_tolerance(carrier.tolerance_secs)))
        })
        .transpose()?;

    info!(
        billing = billing_verifier.is_some(),
        carrier = carrier_verifier.is_some(),
        "Webhook verifiers configured"
    );

    Ok(AppState {
        limiter: Arc::new(limiter),
        presets: Arc::new(config.rate_limit.presets.clone()),
        rate_limit_prefix: Arc::from(config.rate_limit.prefix.as_str()),
        secrets: Arc::new(secrets),
        webhooks: Arc::new(config.webhooks.clone()),
        billing_verifier,
        carrier_verifier,
        sink: Arc::new(LoggingEventSink::new()),
        dispatcher: Arc::new(LoggingDispatcher::new()),
        clock,
    })
}
