use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{with_rate_limit_headers, ApiError, RateLimited, ValidatedJson};
use crate::domain::PlaceCallRequest;

/// POST /api/tenants/{tenant_id}/calls
///
/// Fails closed by default when the counter store is down.
pub async fn place_call(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    ValidatedJson(request): ValidatedJson<PlaceCallRequest>,
) -> Result<Response, ApiError> {
    let config = state.presets.call_initiate(&tenant_id, state.prefix())?;
    let decision = state.limiter.check(&config).await;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    let receipt = state.dispatcher.place_call(&tenant_id, request).await?;
    info!(%tenant_id, receipt_id = %receipt.id, "call_queued");

    Ok(with_rate_limit_headers((StatusCode::ACCEPTED, Json(receipt)), &decision))
}
