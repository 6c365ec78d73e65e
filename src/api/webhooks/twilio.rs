//! Telephony provider callbacks signed with `X-Twilio-Signature`

use axum::{
    extract::{Request, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{dispatch_event, InboundWebhook};
use crate::api::state::AppState;
use crate::api::types::{with_rate_limit_headers, ApiError, RateLimited};
use crate::domain::{WebhookEvent, WebhookSource};
use crate::infrastructure::secrets::SecretResolution;
use crate::infrastructure::signature::Verifier;

pub const TWILIO_SIGNATURE_HEADER: &str = "X-Twilio-Signature";

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

pub async fn voice_inbound(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    handle_callback(state, WebhookSource::VoiceInbound, request).await
}

pub async fn voice_status(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    handle_callback(state, WebhookSource::VoiceStatus, request).await
}

pub async fn recording(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    handle_callback(state, WebhookSource::Recording, request).await
}

pub async fn sms_inbound(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    handle_callback(state, WebhookSource::SmsInbound, request).await
}

pub async fn sms_status(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    handle_callback(state, WebhookSource::SmsStatus, request).await
}

async fn handle_callback(
    state: AppState,
    source: WebhookSource,
    request: Request,
) -> Result<Response, ApiError> {
    let inbound = InboundWebhook::read(request, &state.webhooks).await;

    let config = if source.is_status_callback() {
        let key = inbound.param("AccountSid").unwrap_or(&inbound.client_ip);
        state.presets.webhook_status(key, state.prefix())?
    } else {
        let key = inbound.param("From").unwrap_or(&inbound.client_ip);
        state.presets.webhook_inbound(key, state.prefix())?
    };

    let decision = state.limiter.check(&config).await;
    if !decision.success {
        return Ok(RateLimited(decision).into_response());
    }

    if let Some(tenant_id) = verify(&state, source, &inbound).await {
        debug!(%source, %tenant_id, "webhook_verified");
        let event = WebhookEvent::new(source, state.clock.now())
            .with_tenant(tenant_id)
            .with_params(inbound.params);
        dispatch_event(&state, event);
    }

    Ok(with_rate_limit_headers(
        ([(header::CONTENT_TYPE, "text/xml")], EMPTY_TWIML),
        &decision,
    ))
}

/// Returns the tenant when the callback carries a valid signature for it
async fn verify(state: &AppState, source: WebhookSource, inbound: &InboundWebhook) -> Option<String> {
    let Some(account_sid) = inbound.param("AccountSid") else {
        warn!(%source, client_ip = %inbound.client_ip, "webhook_missing_account_sid");
        return None;
    };

    match state.secrets.resolve(account_sid).await {
        SecretResolution::Resolved {
            tenant_id,
            auth_token,
        } => {
            let signed = inbound.signed_request(TWILIO_SIGNATURE_HEADER, None);
            Verifier::hmac_canonical(auth_token)
                .verify_with(&signed, state.clock.as_ref())
                .then_some(tenant_id)
        }
        SecretResolution::UnknownTenant => {
            warn!(%source, account_sid, client_ip = %inbound.client_ip, "webhook_unknown_tenant");
            None
        }
        SecretResolution::Unavailable { reason } => {
            warn!(%source, account_sid, reason = %reason, "webhook_secret_unavailable");
            None
        }
    }
}
