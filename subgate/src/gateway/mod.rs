//! Payment gateway abstraction layer.
//!
//! This module defines the `PaymentGateway` trait which abstracts hosted
//! checkout and transaction verification across different gateways.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GatewayConfig;

pub mod dummy;
pub mod paystack;

/// Create a payment gateway from configuration
///
/// This is the single point where we convert config into gateway instances.
/// Adding a new gateway requires adding a match arm here.
pub fn create_gateway(config: &GatewayConfig) -> Arc<dyn PaymentGateway> {
    match config {
        GatewayConfig::Paystack(paystack_config) => Arc::new(paystack::PaystackGateway::new(paystack_config.clone())),
        GatewayConfig::Dummy(dummy_config) => Arc::new(dummy::DummyGateway::new(dummy_config.clone())),
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the payment gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway API error: {0}")]
    Api(String),

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid gateway data: {0}")]
    InvalidData(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Api(_) | GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidData(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show the caller; gateway responses can echo keys back
    pub fn user_message(&self) -> String {
        "Payment provider request failed".to_string()
    }
}

/// A request to start a hosted-checkout payment.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub email: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    /// Where the gateway sends the customer after payment
    pub callback_url: Option<Url>,
    /// Gateway plan code for recurring billing
    pub plan: Option<String>,
    pub metadata: CheckoutMetadata,
}

/// Free-form customer details carried through checkout and echoed back on
/// webhook events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_name: Option<String>,
}

/// Hosted-checkout handle returned by the gateway.
#[derive(Debug, Clone)]
pub struct Checkout {
    /// URL the customer is redirected to for payment
    pub authorization_url: String,
    /// Gateway transaction reference
    pub reference: String,
}

/// Customer identity attached to a transaction.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Customer {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Customer {
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

/// Card metadata the gateway stores against a charge. The authorization code
/// permits future charges against the same card.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CardAuthorization {
    pub authorization_code: Option<String>,
    pub last4: Option<String>,
    pub card_type: Option<String>,
    pub bank: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
}

impl CardAuthorization {
    /// Human-readable summary for receipts, e.g. "Visa •••• 4081".
    pub fn masked(&self) -> Option<String> {
        let last4 = self.last4.as_deref()?;
        let card_type = self.card_type.as_deref().unwrap_or("Card").trim();
        Some(format!("{card_type} •••• {last4}"))
    }
}

/// Authoritative transaction state from the gateway's verify endpoint.
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    pub reference: String,
    /// Gateway transaction state, e.g. "success", "failed", "abandoned"
    pub status: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub gateway_response: Option<String>,
    pub channel: Option<String>,
    pub customer: Option<Customer>,
    pub authorization: Option<CardAuthorization>,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Abstract payment gateway interface
///
/// Implementors provide hosted checkout, transaction verification, and
/// webhook signature checking for a specific gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a hosted-checkout payment.
    ///
    /// Returns the URL the customer should be redirected to, plus the
    /// transaction reference for later verification.
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout>;

    /// Re-query the gateway's authoritative status for a transaction.
    ///
    /// Webhook payloads are never trusted on their own; callers must check
    /// [`VerifiedTransaction::is_success`] before acting on a success event.
    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction>;

    /// Name of the request header carrying the webhook signature.
    fn signature_header(&self) -> &'static str;

    /// Check a webhook signature over the raw request body.
    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool;
}
