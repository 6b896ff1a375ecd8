//! Dummy payment gateway implementation.
//!
//! No external calls: initialization hands back a canned redirect URL and
//! verification reports the configured status. Useful for development and
//! testing; the recorded calls let tests assert what the service did.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::DummyGatewayConfig,
    gateway::{Checkout, CheckoutRequest, PaymentGateway, Result, VerifiedTransaction},
    webhooks::signing,
};

/// Dummy gateway that records calls and never leaves the process
pub struct DummyGateway {
    config: DummyGatewayConfig,
    initialized: Mutex<Vec<CheckoutRequest>>,
    verified: Mutex<Vec<String>>,
}

impl DummyGateway {
    pub fn new(config: DummyGatewayConfig) -> Self {
        Self {
            config,
            initialized: Mutex::new(Vec::new()),
            verified: Mutex::new(Vec::new()),
        }
    }

    /// Checkout requests seen so far, in order.
    pub fn initialized(&self) -> Vec<CheckoutRequest> {
        self.initialized.lock().expect("dummy gateway lock poisoned").clone()
    }

    /// References passed to `verify` so far, in order.
    pub fn verified_references(&self) -> Vec<String> {
        self.verified.lock().expect("dummy gateway lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentGateway for DummyGateway {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout> {
        let reference = format!("dummy_{}", Uuid::new_v4().simple());

        tracing::info!(reference = %reference, email = %request.email, "Dummy gateway initialized checkout");
        self.initialized.lock().expect("dummy gateway lock poisoned").push(request.clone());

        Ok(Checkout {
            authorization_url: format!("https://checkout.invalid/pay/{reference}"),
            reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction> {
        self.verified
            .lock()
            .expect("dummy gateway lock poisoned")
            .push(reference.to_string());

        Ok(VerifiedTransaction {
            reference: reference.to_string(),
            status: self.config.verify_status.clone(),
            amount: self.config.amount,
            currency: self.config.currency.clone(),
            paid_at: Some(Utc::now()),
            gateway_response: Some(self.config.verify_status.clone()),
            channel: Some("card".to_string()),
            customer: None,
            authorization: None,
        })
    }

    fn signature_header(&self) -> &'static str {
        // Same header as the real gateway so the webhook route behaves alike
        super::paystack::SIGNATURE_HEADER
    }

    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        signing::verify_signature(self.config.secret.as_bytes(), body, signature)
    }
}
