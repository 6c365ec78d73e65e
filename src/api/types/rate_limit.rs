//! Rate limit headers and the 429 response

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::domain::RateLimitResult;

static LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Writes `X-RateLimit-*` (and `Retry-After` when set) into `headers`
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(LIMIT.clone(), HeaderValue::from(result.limit));
    headers.insert(REMAINING.clone(), HeaderValue::from(result.remaining));
    headers.insert(RESET.clone(), HeaderValue::from(result.reset));

    if let Some(retry_after) = result.retry_after {
        headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
}

/// Attaches rate limit headers to a successful response
pub fn with_rate_limit_headers(response: impl IntoResponse, result: &RateLimitResult) -> Response {
    let mut response = response.into_response();
    apply_rate_limit_headers(response.headers_mut(), result);
    response
}

/// 429 Too Many Requests carrying the rejecting decision
#[derive(Debug, Clone, Copy)]
pub struct RateLimited(pub RateLimitResult);

impl IntoResponse for RateLimited {
    fn into_response(self) -> Response {
        let message = match self.0.retry_after {
            Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds.", seconds),
            None => "Rate limit exceeded.".to_string(),
        };

        with_rate_limit_headers(
            ApiError::rate_limited(message).with_code("rate_limit_exceeded"),
            &self.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use super::*;

    #[test]
    fn test_rejection_response() {
        let response = RateLimited(RateLimitResult::rejected(10, 1_700_000_060, 42)).into_response();
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(headers["x-ratelimit-limit"], "10");
        assert_eq!(headers["x-ratelimit-remaining"], "0");
        assert_eq!(headers["x-ratelimit-reset"], "1700000060");
        assert_eq!(headers[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_success_headers_omit_retry_after() {
        let response = with_rate_limit_headers(
            StatusCode::OK,
            &RateLimitResult::allowed(10, 7, 1_700_000_060),
        );

        assert_eq!(response.headers()["x-ratelimit-remaining"], "7");
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
