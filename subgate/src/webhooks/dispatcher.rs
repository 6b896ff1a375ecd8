//! Webhook event dispatch.
//!
//! Routes signature-verified gateway events to per-kind handlers. Success
//! events are re-verified against the gateway before any notification goes
//! out; a webhook body is never trusted on its own. Errors raised here are
//! logged by the HTTP handler but never change the acknowledgement.

use crate::{
    AppState,
    email::{self, templates},
    errors::{Error, Result},
    money::format_amount,
    webhooks::events::{EventKind, WebhookEvent},
};

/// Dispatch a verified webhook event by kind.
pub async fn dispatch(state: &AppState, event: WebhookEvent) -> Result<()> {
    match event.kind() {
        EventKind::ChargeSuccess => handle_charge_success(state, &event).await,
        EventKind::ChargeFailed => handle_charge_failed(state, &event).await,
        EventKind::SubscriptionCreated => {
            tracing::info!(event = %event.event, "Subscription created on the gateway");
            Ok(())
        }
        EventKind::SubscriptionDisabled => {
            tracing::info!(event = %event.event, "Subscription disabled on the gateway");
            Ok(())
        }
        EventKind::Unknown => {
            tracing::debug!(event = %event.event, "Ignoring webhook event kind");
            Ok(())
        }
    }
}

/// A successful charge: confirm with the gateway, then notify payer and admin.
async fn handle_charge_success(state: &AppState, event: &WebhookEvent) -> Result<()> {
    let reference = event.data.reference.as_deref().ok_or_else(|| Error::BadRequest {
        message: "charge.success event missing reference".to_string(),
    })?;

    // Double-check against the authoritative status endpoint; forged or
    // stale deliveries must not produce a confirmation email.
    let verified = state.gateway.verify(reference).await?;
    if !verified.is_success() {
        tracing::warn!(
            reference,
            status = %verified.status,
            "Gateway did not confirm charge.success; skipping notifications"
        );
        return Ok(());
    }

    // Prefer the verified record over the webhook body where both carry a field
    let customer = verified.customer.as_ref().or(event.data.customer.as_ref());
    let Some(recipient) = customer.and_then(|c| c.email.clone()) else {
        tracing::warn!(reference, "Verified transaction has no customer email; skipping payer notification");
        return Ok(());
    };
    let payer_name = customer.and_then(|c| c.display_name());

    let amount = format_amount(verified.amount, &verified.currency);
    let card = verified
        .authorization
        .as_ref()
        .or(event.data.authorization.as_ref())
        .and_then(|a| a.masked());

    tracing::info!(reference, amount = %amount, "Charge confirmed; queuing notifications");

    email::send_detached(
        state.notifier.clone(),
        templates::payment_confirmed(
            &recipient,
            payer_name.as_deref(),
            &state.config.subscription.plan_name,
            &amount,
            &verified.reference,
            verified.paid_at,
            card.as_deref(),
        ),
    );

    email::send_detached(
        state.notifier.clone(),
        templates::payment_received(
            &state.config.admin_email,
            &recipient,
            payer_name.as_deref(),
            &amount,
            &verified.reference,
        ),
    );

    Ok(())
}

/// A failed charge: tell the payer what happened. Not re-verified; failure
/// events never gate money movement, only a courtesy email.
async fn handle_charge_failed(state: &AppState, event: &WebhookEvent) -> Result<()> {
    let Some(recipient) = event.data.customer.as_ref().and_then(|c| c.email.clone()) else {
        tracing::warn!(event = %event.event, "charge.failed event has no customer email; nothing to send");
        return Ok(());
    };

    let payer_name = event.data.customer.as_ref().and_then(|c| c.display_name());
    let amount = format_amount(
        event.data.amount.unwrap_or(state.config.subscription.amount),
        event.data.currency.as_deref().unwrap_or(&state.config.subscription.currency),
    );
    let reason = event
        .data
        .gateway_response
        .clone()
        .unwrap_or_else(|| "The payment could not be processed".to_string());

    tracing::info!(
        reference = event.data.reference.as_deref().unwrap_or("-"),
        reason = %reason,
        "Charge failed; queuing payer notification"
    );

    email::send_detached(
        state.notifier.clone(),
        templates::payment_failed(&recipient, payer_name.as_deref(), &amount, &reason),
    );

    Ok(())
}
