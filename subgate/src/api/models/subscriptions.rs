//! Wire models for the subscription endpoint.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Body of `POST /api/subscribe`. Ephemeral: lives for one request, nothing
/// is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub body_goals: Option<String>,
    #[serde(default)]
    pub referral_name: Option<String>,
}

impl SubscribeRequest {
    /// Reject blank required fields before anything talks to the gateway.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("phone", &self.phone)] {
            if value.trim().is_empty() {
                return Err(Error::BadRequest {
                    message: format!("{field} is required"),
                });
            }
        }

        if !self.email.contains('@') {
            return Err(Error::BadRequest {
                message: "email is not a valid email address".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    /// Hosted-checkout URL the frontend should navigate to
    pub redirect_url: String,
    /// Gateway transaction reference
    pub reference: String,
}
