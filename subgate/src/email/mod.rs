//! Outbound transactional email.
//!
//! The `Notifier` trait abstracts the sending side; templates live in
//! [`templates`]. Every send in the payment flow is best-effort: failures
//! are logged and swallowed so a slow or broken email provider can never
//! block or fail a payment.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{EmailConfig, MailerConfig};

pub mod file;
pub mod resend;
pub mod templates;

/// A single outbound message. The sender identity comes from the notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Errors that can occur while sending email
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("email API error: {0}")]
    Api(String),

    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write email file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mailer operations
pub type Result<T> = std::result::Result<T, MailerError>;

/// Capability interface for sending transactional email
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Create a notifier from configuration
///
/// This is the single point where we convert config into notifier instances.
pub fn create_notifier(config: &EmailConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let from = format!("{} <{}>", config.from_name, config.from_email);

    match &config.transport {
        MailerConfig::Resend { api_key, base_url } => Ok(Arc::new(resend::ResendNotifier::new(
            api_key.clone(),
            base_url.clone(),
            from,
        ))),
        MailerConfig::File { path } => Ok(Arc::new(file::FileNotifier::new(path, from)?)),
    }
}

/// Send a message on a spawned task, logging and swallowing failures.
///
/// Payment acknowledgement latency stays decoupled from the email provider;
/// callers get no signal back.
pub fn send_detached(notifier: Arc<dyn Notifier>, message: EmailMessage) {
    tokio::spawn(async move {
        match notifier.send(&message).await {
            Ok(()) => {
                tracing::info!(to = %message.to, subject = %message.subject, "Sent notification email");
            }
            Err(e) => {
                tracing::warn!(to = %message.to, subject = %message.subject, error = %e, "Failed to send notification email");
            }
        }
    });
}
