//! API request/response types

pub mod error;
pub mod json;
pub mod rate_limit;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::ValidatedJson;
pub use rate_limit::{with_rate_limit_headers, RateLimited};
