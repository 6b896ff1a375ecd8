//! Gateway webhook endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, webhooks::dispatcher, webhooks::events::WebhookEvent};

/// `POST /api/webhook/paystack`
///
/// Verifies the signature over the raw body before touching the payload.
/// Once the signature checks out the gateway always gets a 200 so it does
/// not retry-storm; parse failures and handler errors are logged and
/// swallowed. Only a missing or invalid signature is rejected.
#[tracing::instrument(skip_all)]
pub async fn gateway_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers.get(state.gateway.signature_header()).and_then(|v| v.to_str().ok());

    // Same response for a missing header and a bad digest: callers learn
    // nothing about which check failed.
    let Some(signature) = signature else {
        tracing::warn!("Webhook rejected: missing signature header");
        return rejection();
    };
    if !state.gateway.verify_webhook_signature(&body, signature) {
        tracing::warn!("Webhook rejected: signature mismatch");
        return rejection();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Acknowledging malformed webhook payload");
            return acknowledgement();
        }
    };

    tracing::info!(
        event = %event.event,
        reference = event.data.reference.as_deref().unwrap_or("-"),
        "Received gateway webhook"
    );

    if let Err(e) = dispatcher::dispatch(&state, event).await {
        tracing::error!(error = %e, "Webhook handler failed; acknowledging anyway");
    }

    acknowledgement()
}

fn acknowledgement() -> Response {
    Json(json!({ "received": true })).into_response()
}

fn rejection() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid signature" }))).into_response()
}
