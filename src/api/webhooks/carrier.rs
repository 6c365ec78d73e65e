//! Carrier callbacks signed with RSA over the timestamp header and raw body

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

pub async fn carrier_webhook(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let inbound = InboundWebhook::read(request, &state.webhooks).await;

    let config = state
        .presets
        .webhook_inbound(&format!("carrier:{}", inbound.client_ip), state.prefix())?;
    let decision = state.limiter.check(&config).await;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    match &state.carrier_verifier {
        Some(verifier) => {
            let carrier = &state.webhooks.carrier;
            let signed =
                inbound.signed_request(&carrier.signature_header, Some(&carrier.timestamp_header));
            if verifier.verify_with(&signed, state.clock.as_ref()) {
                let event =
                    WebhookEvent::new(WebhookSource::Carrier, state.clock.now()).with_body(&inbound.body);
                dispatch_event(&state, event);
            }
        }
        None => warn!(client_ip = %inbound.client_ip, "carrier_webhook_key_not_configured"),
    }

    Ok(with_rate_limit_headers(Json(json!({ "received": true })), &decision))
}
