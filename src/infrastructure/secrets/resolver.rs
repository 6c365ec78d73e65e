//! Decrypt-before-validate lookup of tenant provider tokens

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::error;

use super::cipher::SecretCipher;
use crate::domain::{DomainError, TenantSecretStore};

/// What to do with a stored token that fails to decrypt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptFallback {
    /// Treat the tenant's secret as unavailable; webhooks are dropped
    #[default]
    Reject,
    /// Use the stored value verbatim as a legacy unencrypted token
    Plaintext,
}

/// Outcome of resolving a provider account to its signing secret
#[derive(Clone, PartialEq, Eq)]
pub enum SecretResolution {
    Resolved { tenant_id: String, auth_token: String },
    UnknownTenant,
    Unavailable { reason: String },
}

impl fmt::Debug for SecretResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { tenant_id, .. } => f
                .debug_struct("Resolved")
                .field("tenant_id", tenant_id)
                .field("auth_token", &"[REDACTED]")
                .finish(),
            Self::UnknownTenant => write!(f, "UnknownTenant"),
            Self::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

pub struct TenantSecretResolver {
    store: Arc<dyn TenantSecretStore>,
    cipher: Option<SecretCipher>,
    fallback: DecryptFallback,
}

impl fmt::Debug for TenantSecretResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantSecretResolver")
            .field("has_cipher", &self.cipher.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl TenantSecretResolver {
    pub fn new(
        store: Arc<dyn TenantSecretStore>,
        cipher: Option<SecretCipher>,
        fallback: DecryptFallback,
    ) -> Self {
        Self {
            store,
            cipher,
            fallback,
        }
    }

    /// Fails when tenants exist but no encryption key is configured
    pub async fn ensure_ready(&self) -> Result<(), DomainError> {
        if self.cipher.is_none() && self.store.count().await? > 0 {
            return Err(DomainError::configuration(
                "Tenants are configured but security.encryption_key is not set",
            ));
        }

        Ok(())
    }

    pub async fn resolve(&self, account_sid: &str) -> SecretResolution {
        let secret = match self.store.find_by_account_sid(account_sid).await {
            Ok(Some(secret)) => secret,
            Ok(None) => return SecretResolution::UnknownTenant,
            Err(e) => {
                error!(account_sid, error = %e, "tenant_secret_lookup_failed");
                return SecretResolution::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let Some(cipher) = &self.cipher else {
            error!(account_sid, tenant_id = %secret.tenant_id, "tenant_secret_key_missing");
            return SecretResolution::Unavailable {
                reason: "encryption key not configured".to_string(),
            };
        };

        match cipher.decrypt(&secret.encrypted_auth_token) {
            Ok(auth_token) => SecretResolution::Resolved {
                tenant_id: secret.tenant_id,
                auth_token,
            },
            Err(e) => match self.fallback {
                DecryptFallback::Reject => {
                    error!(
                        account_sid,
                        tenant_id = %secret.tenant_id,
                        error = %e,
                        "tenant_secret_decrypt_failed"
                    );
                    SecretResolution::Unavailable {
                        reason: e.to_string(),
                    }
                }
                DecryptFallback::Plaintext => {
                    error!(
                        account_sid,
                        tenant_id = %secret.tenant_id,
                        error = %e,
                        "tenant_secret_decrypt_failed; using stored value as plaintext token"
                    );
                    SecretResolution::Resolved {
                        tenant_id: secret.tenant_id,
                        auth_token: secret.encrypted_auth_token,
                    }
                }
            },
        }
    }
}
