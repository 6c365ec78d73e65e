//! Billing provider callbacks (timestamped HMAC in a single header)

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use super::{dispatch_event, InboundWebhook};
use crate::api::state::AppState;
use crate::api::types::{with_rate_limit_headers, ApiError, RateLimited};
use crate::domain::{WebhookEvent, WebhookSource};

pub async fn billing_webhook(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let inbound = InboundWebhook::read(request, &state.webhooks).await;

    let config = state
        .presets
        .webhook_inbound(&format!("billing:{}", inbound.client_ip), state.prefix())?;
    let decision = state.limiter.check(&config).await;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    match &state.billing_verifier {
        Some(verifier) => {
            let signed = inbound.signed_request(&state.webhooks.billing.signature_header, None);
            if verifier.verify_with(&signed, state.clock.as_ref()) {
                let event =
                    WebhookEvent::new(WebhookSource::Billing, state.clock.now()).with_body(&inbound.body);
                dispatch_event(&state, event);
            }
        }
        None => warn!(client_ip = %inbound.client_ip, "billing_webhook_secret_not_configured"),
    }

    Ok(with_rate_limit_headers(Json(json!({ "received": true })), &decision))
}
