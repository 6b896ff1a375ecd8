//! Subscription checkout endpoint.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::subscriptions::{SubscribeRequest, SubscribeResponse},
    email::{self, templates},
    errors::Result,
    gateway::{CheckoutMetadata, CheckoutRequest},
    money::format_amount,
};

/// `POST /api/subscribe`
///
/// Validates the form, initializes a hosted checkout with the gateway, and
/// hands the redirect URL back to the frontend. The payer and the admin each
/// get a fire-and-forget email; payment completion itself arrives later via
/// webhook.
#[tracing::instrument(skip_all)]
pub async fn subscribe(State(state): State<AppState>, Json(request): Json<SubscribeRequest>) -> Result<Json<SubscribeResponse>> {
    request.validate()?;

    let subscription = &state.config.subscription;
    let checkout_request = CheckoutRequest {
        email: request.email.clone(),
        amount: subscription.amount,
        currency: subscription.currency.clone(),
        callback_url: state.config.callback_url.clone(),
        plan: subscription.plan.clone(),
        metadata: CheckoutMetadata {
            name: request.name.clone(),
            phone: request.phone.clone(),
            body_goals: request.body_goals.clone(),
            referral_name: request.referral_name.clone(),
        },
    };

    let checkout = state.gateway.initialize(&checkout_request).await.map_err(|e| {
        tracing::error!(email = %request.email, error = %e, "Failed to initialize checkout");
        e
    })?;

    tracing::info!(reference = %checkout.reference, email = %request.email, "Checkout initialized");

    let amount = format_amount(subscription.amount, &subscription.currency);

    email::send_detached(
        state.notifier.clone(),
        templates::subscription_initiated(
            &request.email,
            &request.name,
            &subscription.plan_name,
            &amount,
            &checkout.authorization_url,
        ),
    );

    email::send_detached(
        state.notifier.clone(),
        templates::new_subscription(
            &state.config.admin_email,
            &request.name,
            &request.email,
            &request.phone,
            request.body_goals.as_deref(),
            request.referral_name.as_deref(),
        ),
    );

    Ok(Json(SubscribeResponse {
        redirect_url: checkout.authorization_url,
        reference: checkout.reference,
    }))
}
