//! Rate limit configuration value objects

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Admission budget for one identifier.
///
/// Not persisted: call sites build one per request. Two configs share a budget
/// exactly when their [`RateLimitConfig::key`] values are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    identifier: String,
    limit: u64,
    window_secs: u64,
    prefix: String,
    fail_open: Option<bool>,
}

impl RateLimitConfig {
    /// Creates a validated configuration
    pub fn new(
        identifier: impl Into<String>,
        limit: u64,
        window_secs: u64,
        prefix: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let identifier = identifier.into();
        let prefix = prefix.into();

        if identifier.trim().is_empty() {
            return Err(DomainError::validation("Rate limit identifier cannot be empty"));
        }

        if prefix.trim().is_empty() {
            return Err(DomainError::validation("Rate limit prefix cannot be empty"));
        }

        if limit == 0 {
            return Err(DomainError::validation("Rate limit must be greater than zero"));
        }

        if window_secs == 0 {
            return Err(DomainError::validation(
                "Rate limit window must be at least one second",
            ));
        }

        Ok(Self {
            identifier,
            limit,
            window_secs,
            prefix,
            fail_open: None,
        })
    }

    /// Overrides the limiter-wide failure policy for this budget
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = Some(fail_open);
        self
    }

    pub(crate) fn with_fail_open_override(mut self, fail_open: Option<bool>) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// Counter key in the shared store: `prefix:identifier`
    pub fn key(&self) -> String {
        format!("{}:{}", self.prefix, self.identifier)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn fail_open(&self) -> Option<bool> {
        self.fail_open
    }
}

/// One tier of a multi-tier limit (e.g. per-second, per-minute, per-hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitTier {
    pub limit: u64,
    pub window_secs: u64,
}

impl RateLimitTier {
    pub const fn new(limit: u64, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    pub const fn per_second(limit: u64) -> Self {
        Self::new(limit, 1)
    }

    pub const fn per_minute(limit: u64) -> Self {
        Self::new(limit, 60)
    }

    pub const fn per_hour(limit: u64) -> Self {
        Self::new(limit, 3600)
    }

    /// Builds the config for the tier at `index`, keyed `identifier:tier{index}`
    pub fn to_config(
        &self,
        identifier: &str,
        index: usize,
        prefix: &str,
    ) -> Result<RateLimitConfig, DomainError> {
        RateLimitConfig::new(
            format!("{}:tier{}", identifier, index),
            self.limit,
            self.window_secs,
            prefix,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_joins_prefix_and_identifier() {
        let config = RateLimitConfig::new("tenant:abc:sms:send", 10, 60, "api").unwrap();
        assert_eq!(config.key(), "api:tenant:abc:sms:send");
    }

    #[test]
    fn test_rejects_zero_limit() {
        let result = RateLimitConfig::new("tenant:abc", 0, 60, "api");
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = RateLimitConfig::new("tenant:abc", 10, 0, "api");
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_rejects_blank_identifier_and_prefix() {
        assert!(RateLimitConfig::new("  ", 10, 60, "api").is_err());
        assert!(RateLimitConfig::new("tenant:abc", 10, 60, "").is_err());
    }

    #[test]
    fn test_fail_open_defaults_to_limiter_policy() {
        let config = RateLimitConfig::new("tenant:abc", 10, 60, "api").unwrap();
        assert_eq!(config.fail_open(), None);

        let config = config.with_fail_open(false);
        assert_eq!(config.fail_open(), Some(false));
    }

    #[test]
    fn test_tier_sub_key() {
        let tier = RateLimitTier::per_minute(30);
        let config = tier.to_config("tenant:abc:bulk", 1, "api").unwrap();

        assert_eq!(config.key(), "api:tenant:abc:bulk:tier1");
        assert_eq!(config.limit(), 30);
        assert_eq!(config.window_secs(), 60);
    }
}
