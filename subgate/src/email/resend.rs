//! Resend send-API transport.
//!
//! One `POST /emails` per message with a bearer key. No delivery-state
//! tracking: a 2xx from the API is as far as this service follows a message.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::email::{EmailMessage, MailerError, Notifier, Result};

pub struct ResendNotifier {
    api_key: String,
    base_url: Url,
    from: String,
    http: reqwest::Client,
}

impl ResendNotifier {
    pub fn new(api_key: String, base_url: Url, from: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create email HTTP client");

        Self {
            api_key,
            base_url,
            from,
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self.http.post(self.endpoint()).bearer_auth(&self.api_key).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MailerError::Api(format!("send returned {status}: {text}")));
        }

        Ok(())
    }
}
