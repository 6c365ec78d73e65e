//! Provider callback endpoints
//!
//! Every route is rate limited first, then signature checked. Anything past
//! the rate limit gets a 200 so providers do not retry; only verified events
//! reach the sink.

mod billing;
mod carrier;
mod request;
mod twilio;

pub use request::{client_ip, signed_url, InboundWebhook};

use axum::{routing::post, Router};
use tracing::error;

use super::state::AppState;
use crate::domain::WebhookEvent;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/voice/inbound", post(twilio::voice_inbound))
        .route("/webhooks/voice/status", post(twilio::voice_status))
        .route("/webhooks/voice/recording", post(twilio::recording))
        .route("/webhooks/sms/inbound", post(twilio::sms_inbound))
        .route("/webhooks/sms/status", post(twilio::sms_status))
        .route("/webhooks/billing", post(billing::billing_webhook))
        .route("/webhooks/carrier", post(carrier::carrier_webhook))
}

/// Hands a verified event to the sink without holding up the response
fn dispatch_event(state: &AppState, event: WebhookEvent) {
    let sink = state.sink.clone();

    tokio::spawn(async move {
        let event_id = event.id;
        let source = event.source;

        if let Err(e) = sink.deliver(event).await {
            error!(%event_id, %source, error = %e, "webhook_event_delivery_failed");
        }
    });
}
