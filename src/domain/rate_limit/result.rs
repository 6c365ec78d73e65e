//! Rate limit decision

use serde::Serialize;

/// Outcome of a rate limit check. Derived per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    /// Whether the request may proceed
    pub success: bool,
    /// Budget size the decision was made against
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
    /// Unix timestamp (seconds) at which the window resets
    pub reset: i64,
    /// Seconds to wait before retrying; set on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl RateLimitResult {
    pub fn allowed(limit: u64, remaining: u64, reset: i64) -> Self {
        Self {
            success: true,
            limit,
            remaining,
            reset,
            retry_after: None,
        }
    }

    pub fn rejected(limit: u64, reset: i64, retry_after: u64) -> Self {
        Self {
            success: false,
            limit,
            remaining: 0,
            reset,
            retry_after: Some(retry_after),
        }
    }

    /// Degenerate success for an empty tier list
    pub fn unlimited(now: i64) -> Self {
        Self::allowed(u64::MAX, u64::MAX, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_has_no_remaining() {
        let result = RateLimitResult::rejected(10, 1_700_000_060, 60);

        assert!(!result.success);
        assert_eq!(result.remaining, 0);
        assert_eq!(result.retry_after, Some(60));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(RateLimitResult::rejected(10, 100, 42)).unwrap();

        assert_eq!(json["retryAfter"], 42);
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_allowed_omits_retry_after() {
        let json = serde_json::to_value(RateLimitResult::allowed(10, 9, 100)).unwrap();
        assert!(json.get("retryAfter").is_none());
    }
}
