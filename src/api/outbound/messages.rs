use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{with_rate_limit_headers, ApiError, RateLimited, ValidatedJson};
use crate::domain::{BulkMessageRequest, RateLimitPresets, SendMessageRequest};

/// POST /api/tenants/{tenant_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> Result<Response, ApiError> {
    let config = state.presets.sms_send(&tenant_id, state.prefix())?;
    let decision = state.limiter.check(&config).await;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    let receipt = state.dispatcher.send_message(&tenant_id, request).await?;
    info!(%tenant_id, receipt_id = %receipt.id, remaining = decision.remaining, "message_queued");

    Ok(with_rate_limit_headers((StatusCode::ACCEPTED, Json(receipt)), &decision))
}

/// POST /api/tenants/{tenant_id}/messages/bulk
///
/// Limited per second, minute and hour at once; the tightest tier decides.
pub async fn send_bulk(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    ValidatedJson(request): ValidatedJson<BulkMessageRequest>,
) -> Result<Response, ApiError> {
    let identifier = RateLimitPresets::bulk_send_identifier(&tenant_id);
    let decision = state
        .limiter
        .multi_tier(&identifier, state.presets.bulk_send_tiers(), state.prefix())
        .await?;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    let recipients = request.to.len();
    let receipt = state.dispatcher.send_bulk(&tenant_id, request).await?;
    info!(%tenant_id, receipt_id = %receipt.id, recipients, "bulk_message_queued");

    Ok(with_rate_limit_headers((StatusCode::ACCEPTED, Json(receipt)), &decision))
}
