//! API middleware components

pub mod logging;
pub mod metrics;
pub mod security;

use axum::{body::Body, extract::MatchedPath, http::Request};

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::{body_size_middleware, security_headers_middleware, MAX_BODY_SIZE};

/// Route pattern when matched, raw path otherwise (bounded label cardinality)
fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
