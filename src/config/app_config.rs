use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DomainError, RateLimitPresets, TenantSecret};
use crate::infrastructure::counter_store::{CounterStoreConfig, StoreBackend};
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::secrets::DecryptFallback;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub observability: ObservabilityConfig,
    pub store: StoreConfig,
    pub rate_limit: RateLimitSettings,
    pub webhooks: WebhookConfig,
    pub security: SecurityConfig,
    /// Encrypted tenant credentials, keyed by provider account SID
    pub tenants: Vec<TenantSecret>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Counter store selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    pub command_timeout_ms: u64,
    /// Capacity of the in-memory store
    pub max_keys: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Admit requests when the counter store is unavailable
    pub fail_open: bool,
    /// Key namespace for every counter
    pub prefix: String,
    pub presets: RateLimitPresets,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Externally visible base URL the provider signs against, e.g.
    /// `https://crm.example.com`. Overrides Host and forwarded headers.
    pub public_base_url: Option<String>,
    /// Honour `X-Forwarded-Proto`/`X-Forwarded-Host`/`X-Forwarded-For`
    pub trust_forwarded_headers: bool,
    pub billing: BillingWebhookConfig,
    pub carrier: CarrierWebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingWebhookConfig {
    pub signing_secret: Option<String>,
    pub signature_header: String,
    pub tolerance_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarrierWebhookConfig {
    pub public_key_pem: Option<String>,
    pub signature_header: String,
    pub timestamp_header: String,
    pub tolerance_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// 64 hex characters (AES-256 key) used to decrypt tenant tokens
    pub encryption_key: Option<String>,
    pub decrypt_fallback: DecryptFallback,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            command_timeout_ms: 500,
            max_keys: 100_000,
        }
    }
}

impl StoreConfig {
    pub fn counter_store_config(&self) -> CounterStoreConfig {
        CounterStoreConfig {
            backend: self.backend,
            redis_url: self.redis_url.clone(),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            max_keys: self.max_keys,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            fail_open: true,
            prefix: "api".to_string(),
            presets: RateLimitPresets::default(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            trust_forwarded_headers: true,
            billing: BillingWebhookConfig::default(),
            carrier: CarrierWebhookConfig::default(),
        }
    }
}

impl Default for BillingWebhookConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            signature_header: "Stripe-Signature".to_string(),
            tolerance_secs: 300,
        }
    }
}

impl Default for CarrierWebhookConfig {
    fn default() -> Self {
        Self {
            public_key_pem: None,
            signature_header: "X-Carrier-Signature".to_string(),
            timestamp_header: "X-Carrier-Timestamp".to_string(),
            tolerance_secs: 600,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_env(Self::environment())
    }

    /// `APP__SECTION__KEY` environment overrides
    fn environment() -> config::Environment {
        config::Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }

    /// Checks settings that cannot be expressed in the types
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rate_limit.prefix.trim().is_empty() {
            return Err(DomainError::configuration("rate_limit.prefix cannot be empty"));
        }

        self.rate_limit.presets.validate(&self.rate_limit.prefix)?;

        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(DomainError::configuration(
                "store.redis_url is required when store.backend is redis",
            ));
        }

        if let Some(base) = &self.webhooks.public_base_url {
            let parsed = url::Url::parse(base).map_err(|e| {
                DomainError::configuration(format!("Invalid webhooks.public_base_url: {}", e))
            })?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DomainError::configuration(
                    "webhooks.public_base_url must be an http(s) URL",
                ));
            }
        }

        if !self.tenants.is_empty() && self.security.encryption_key.is_none() {
            return Err(DomainError::configuration(
                "Tenants are configured but security.encryption_key is not set",
            ));
        }

        Ok(())
    }
}
