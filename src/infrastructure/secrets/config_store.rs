use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{DomainError, TenantSecret, TenantSecretStore};

/// Tenant secrets loaded from configuration, indexed by provider account SID
#[derive(Debug, Clone, Default)]
pub struct ConfigTenantSecretStore {
    by_account_sid: HashMap<String, TenantSecret>,
}

impl ConfigTenantSecretStore {
    pub fn new(tenants: impl IntoIterator<Item = TenantSecret>) -> Self {
        Self {
            by_account_sid: tenants
                .into_iter()
                .map(|tenant| (tenant.account_sid.clone(), tenant))
                .collect(),
        }
    }
}

#[async_trait]
impl TenantSecretStore for ConfigTenantSecretStore {
    async fn find_by_account_sid(
        &self,
        account_sid: &str,
    ) -> Result<Option<TenantSecret>, DomainError> {
        Ok(self.by_account_sid.get(account_sid).cloned())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.by_account_sid.len())
    }
}
