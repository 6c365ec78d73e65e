//! Tenant-initiated sends, rate limited before they reach the provider

mod calls;
mod messages;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant_id}/messages", post(messages::send_message))
        .route("/api/tenants/{tenant_id}/messages/bulk", post(messages::send_bulk))
        .route("/api/tenants/{tenant_id}/calls", post(calls::place_call))
}
