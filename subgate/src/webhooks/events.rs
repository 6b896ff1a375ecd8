//! Gateway webhook event envelope and payload types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::gateway::{CardAuthorization, Customer};

/// Event kinds the dispatcher understands. Anything else is logged and
/// acknowledged without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ChargeSuccess,
    ChargeFailed,
    SubscriptionCreated,
    SubscriptionDisabled,
    Unknown,
}

impl EventKind {
    /// Total mapping from the gateway's event name; unknown names are a
    /// first-class kind, not an error.
    pub fn parse(event: &str) -> Self {
        match event {
            "charge.success" => Self::ChargeSuccess,
            "charge.failed" => Self::ChargeFailed,
            "subscription.create" => Self::SubscriptionCreated,
            "subscription.disable" => Self::SubscriptionDisabled,
            _ => Self::Unknown,
        }
    }
}

/// Webhook envelope: `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: TransactionData,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event)
    }
}

/// Transaction payload carried by charge events.
///
/// Every field is optional: the gateway varies the shape per event kind and
/// adds fields over time, and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionData {
    pub reference: Option<String>,
    /// Amount in minor units
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    /// Gateway's human-readable outcome, e.g. "Successful" or "Declined"
    pub gateway_response: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub customer: Option<Customer>,
    pub authorization: Option<CardAuthorization>,
}
