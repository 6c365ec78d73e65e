//! Fixed-window rate limiter over a shared counter store
//!
//! Each check costs two store round trips: a pipelined `GET`+`TTL` read and,
//! when admitted, a pipelined `INCR`(+`EXPIRE`) write. The window is anchored
//! at the first request because the TTL is only set when the counter is
//! created.
//!
//! The read and the increment are not one atomic step, so concurrent checks
//! against the same key that land within one store round trip of each other
//! can all observe a permissive count. Overshoot is bounded by that
//! concurrency, never unbounded; increments themselves are never lost.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::{
    Clock, CounterStore, DomainError, RateLimitConfig, RateLimitResult, RateLimitTier,
    SystemClock,
};
use crate::infrastructure::observability::{
    record_rate_limit_decision, record_rate_limit_store_error,
};

/// Admission control shared by every protected route
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    fail_open: bool,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("store", &self.store.backend_name())
            .field("fail_open", &self.fail_open)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a limiter that fails open on store errors
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            fail_open: true,
        }
    }

    /// Sets the policy applied when the store fails and the config has no override
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Decides whether one more request fits the budget, consuming a slot if so.
    ///
    /// Never fails: store errors are resolved by the failure policy.
    pub async fn check(&self, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.unix_timestamp();

        match self.check_at(config, now).await {
            Ok(result) => {
                let outcome = if result.success { "allowed" } else { "rejected" };
                record_rate_limit_decision(config.prefix(), outcome);

                debug!(
                    key = %config.key(),
                    success = result.success,
                    remaining = result.remaining,
                    "rate_limit_checked"
                );

                result
            }
            Err(error) => self.on_store_error(config, now, &error),
        }
    }

    /// Checks every tier concurrently against `identifier:tier{N}` sub-keys.
    ///
    /// Returns the first rejected tier (in the given order) or, when all admit,
    /// the most restrictive one. An empty tier list admits without limit.
    pub async fn multi_tier(
        &self,
        identifier: &str,
        tiers: &[RateLimitTier],
        prefix: &str,
    ) -> Result<RateLimitResult, DomainError> {
        if tiers.is_empty() {
            return Ok(RateLimitResult::unlimited(self.clock.unix_timestamp()));
        }

        let configs = tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| tier.to_config(identifier, index, prefix))
            .collect::<Result<Vec<_>, _>>()?;

        let results = join_all(configs.iter().map(|config| self.check(config))).await;

        if let Some(rejected) = results.iter().find(|result| !result.success) {
            return Ok(*rejected);
        }

        results
            .into_iter()
            .min_by_key(|result| result.remaining)
            .ok_or_else(|| DomainError::internal("No tier results"))
    }

    async fn check_at(
        &self,
        config: &RateLimitConfig,
        now: i64,
    ) -> Result<RateLimitResult, DomainError> {
        let key = config.key();
        let window = config.window_secs();
        let limit = config.limit();

        let snapshot = self.store.snapshot(&key).await?;
        let count = snapshot.count();

        let reset = match snapshot.ttl_secs {
            Some(ttl) if snapshot.exists() => now + ttl as i64,
            _ => now + window as i64,
        };

        if count >= limit {
            let retry_after = snapshot.ttl_secs.unwrap_or(window);
            return Ok(RateLimitResult::rejected(limit, reset, retry_after));
        }

        // A new counter gets its window here; a counter left without a TTL
        // (crash between INCR and EXPIRE) is healed the same way.
        let expire = snapshot.ttl_secs.is_none().then_some(window);

        self.store.increment(&key, expire).await?;

        Ok(RateLimitResult::allowed(limit, limit - count - 1, reset))
    }

    fn on_store_error(
        &self,
        config: &RateLimitConfig,
        now: i64,
        error: &DomainError,
    ) -> RateLimitResult {
        let fail_open = config.fail_open().unwrap_or(self.fail_open);
        let window = config.window_secs();
        let reset = now + window as i64;

        record_rate_limit_store_error(config.prefix());

        warn!(
            key = %config.key(),
            backend = self.store.backend_name(),
            fail_open,
            error = %error,
            "rate_limit_store_error"
        );

        if fail_open {
            record_rate_limit_decision(config.prefix(), "fail_open");
            RateLimitResult::allowed(config.limit(), config.limit(), reset)
        } else {
            record_rate_limit_decision(config.prefix(), "fail_closed");
            RateLimitResult::rejected(config.limit(), reset, window)
        }
    }
}
