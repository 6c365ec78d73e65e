use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Encrypted per-tenant provider credential
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TenantSecret {
    pub tenant_id: String,
    pub account_sid: String,
    /// AES-GCM ciphertext of the provider auth token
    pub encrypted_auth_token: String,
}

/// Lookup of tenant credentials by provider account
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantSecretStore: Send + Sync {
    async fn find_by_account_sid(
        &self,
        account_sid: &str,
    ) -> Result<Option<TenantSecret>, DomainError>;

    /// Number of tenants known to the store
    async fn count(&self) -> Result<usize, DomainError>;
}
