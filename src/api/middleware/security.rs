//! Security headers and request size guard

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::types::ApiError;

/// Maximum accepted request body (1 MiB). Provider callbacks are small;
/// recordings are referenced by URL, never uploaded.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

/// Rejects requests whose declared Content-Length exceeds [`MAX_BODY_SIZE`]
pub async fn body_size_middleware(request: Request<Body>, next: Next) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Err(error) = validate_content_length(declared) {
        return error.into_response();
    }

    next.run(request).await
}

fn validate_content_length(content_length: Option<usize>) -> Result<(), ApiError> {
    match content_length {
        Some(len) if len > MAX_BODY_SIZE => Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            crate::api::types::ApiErrorType::InvalidRequestError,
            format!(
                "Request body too large: {} bytes (max: {} bytes)",
                len, MAX_BODY_SIZE
            ),
        )),
        _ => Ok(()),
    }
}
