//! Distributed fixed-window rate limiting

mod limiter;

pub use limiter::RateLimiter;
