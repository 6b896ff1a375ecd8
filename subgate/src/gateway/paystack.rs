//! Paystack gateway implementation.
//!
//! Speaks the Paystack REST API: `POST /transaction/initialize` for hosted
//! checkout and `GET /transaction/verify/{reference}` for authoritative
//! status. Webhooks are signed with the account secret key (hex HMAC-SHA512
//! of the raw body in the `x-paystack-signature` header).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::PaystackConfig,
    gateway::{CardAuthorization, Checkout, CheckoutMetadata, CheckoutRequest, Customer, GatewayError, PaymentGateway, Result, VerifiedTransaction},
    webhooks::signing,
};

/// Header Paystack sends the webhook signature in.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Paystack payment gateway
pub struct PaystackGateway {
    secret_key: String,
    base_url: Url,
    http: reqwest::Client,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create gateway HTTP client");

        Self {
            secret_key: config.secret_key,
            base_url: config.base_url,
            http,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

/// Paystack response envelope: `status` reports whether the API call itself
/// succeeded; `data` is the operation payload.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_data(self, operation: &str) -> Result<T> {
        if !self.status {
            return Err(GatewayError::Api(format!("{operation}: {}", self.message)));
        }
        self.data
            .ok_or_else(|| GatewayError::InvalidData(format!("{operation}: response missing data")))
    }
}

#[derive(Debug, Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    /// Paystack expects the amount in minor units as a string
    amount: String,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a str>,
    metadata: &'a CheckoutMetadata,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    gateway_response: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    authorization: Option<CardAuthorization>,
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout> {
        let body = InitializeRequest {
            email: &request.email,
            amount: request.amount.to_string(),
            currency: &request.currency,
            callback_url: request.callback_url.as_ref().map(Url::as_str),
            plan: request.plan.as_deref(),
            metadata: &request.metadata,
        };

        let response = self
            .http
            .post(self.endpoint("transaction/initialize"))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Paystack initialize returned an error: {text}");
            return Err(GatewayError::Api(format!("initialize returned {status}")));
        }

        let envelope: ApiResponse<InitializeData> = response.json().await?;
        let data = envelope.into_data("initialize")?;

        tracing::info!(reference = %data.reference, "Initialized Paystack checkout");

        Ok(Checkout {
            authorization_url: data.authorization_url,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction> {
        let response = self
            .http
            .get(self.endpoint(&format!("transaction/verify/{reference}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(reference, %status, "Paystack verify returned an error: {text}");
            return Err(GatewayError::Api(format!("verify returned {status}")));
        }

        let envelope: ApiResponse<VerifyData> = response.json().await?;
        let data = envelope.into_data("verify")?;

        tracing::debug!(reference = %data.reference, status = %data.status, "Verified Paystack transaction");

        Ok(VerifiedTransaction {
            reference: data.reference,
            status: data.status,
            amount: data.amount,
            currency: data.currency,
            paid_at: data.paid_at,
            gateway_response: data.gateway_response,
            channel: data.channel,
            customer: data.customer,
            authorization: data.authorization,
        })
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        signing::verify_signature(self.secret_key.as_bytes(), body, signature)
    }
}
