use axum::{http::Uri, middleware::from_fn, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{
    body_size_middleware, logging_middleware, metrics_middleware, security_headers_middleware,
};
use super::outbound;
use super::state::AppState;
use super::types::ApiError;
use super::webhooks;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Provider callbacks
        .merge(webhooks::routes())
        // Tenant sends
        .merge(outbound::routes())
        .fallback(route_not_found)
        .with_state(state)
        .layer(from_fn(body_size_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path())).with_code("route_not_found")
}
