//! Application configuration.
//!
//! Configuration is loaded from a YAML file and merged with environment
//! variables. Environment variables use the `SUBGATE_` prefix with `__` as
//! the nesting separator:
//!
//! ```bash
//! SUBGATE_PORT=8080
//! SUBGATE_ADMIN_EMAIL="team@example.com"
//! SUBGATE_GATEWAY__PAYSTACK__SECRET_KEY="sk_live_..."
//! SUBGATE_EMAIL__RESEND__API_KEY="re_..."
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SUBGATE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation;
/// the gateway and email credentials are the only values a deployment must
/// supply.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Where the gateway redirects the customer after hosted checkout.
    /// When unset the gateway falls back to the dashboard URL configured
    /// on the gateway account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<Url>,
    /// Address receiving admin notifications (new subscriptions, payments)
    pub admin_email: String,
    /// The subscription product being sold
    pub subscription: SubscriptionConfig,
    /// Payment gateway configuration (Paystack, or dummy for development)
    pub gateway: GatewayConfig,
    /// Email configuration for transactional notifications
    pub email: EmailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            callback_url: None,
            admin_email: "admin@example.com".to_string(),
            subscription: SubscriptionConfig::default(),
            gateway: GatewayConfig::Dummy(DummyGatewayConfig::default()),
            email: EmailConfig::default(),
        }
    }
}

/// The subscription product offered on `/api/subscribe`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriptionConfig {
    /// Price in the currency's minor units (e.g., kobo for NGN)
    pub amount: i64,
    /// ISO 4217 currency code the gateway charges in
    pub currency: String,
    /// Optional gateway plan code; when set, checkout creates a recurring
    /// subscription instead of a one-off charge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Human-readable plan name used in email copy
    pub plan_name: String,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            amount: 3_990_000,
            currency: "NGN".to_string(),
            plan: None,
            plan_name: "Monthly Coaching".to_string(),
        }
    }
}

/// Payment gateway configuration.
///
/// Supports different gateways via an enum. Credentials should be set via
/// environment variables for security.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayConfig {
    /// Paystack hosted checkout
    /// Set credentials via:
    /// - `SUBGATE_GATEWAY__PAYSTACK__SECRET_KEY` - secret API key (sk_...)
    /// - `SUBGATE_GATEWAY__PAYSTACK__PUBLIC_KEY` - public key (pk_...)
    Paystack(PaystackConfig),
    /// Dummy gateway for development and testing
    Dummy(DummyGatewayConfig),
}

/// Paystack gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaystackConfig {
    /// Secret API key (starts with sk_). Also the webhook signing key.
    pub secret_key: String,
    /// Public key (starts with pk_), exposed to the subscription form
    pub public_key: String,
    /// API base URL; overridable for testing against a mock server
    #[serde(default = "default_paystack_base_url")]
    pub base_url: Url,
}

fn default_paystack_base_url() -> Url {
    // Statically known to parse
    Url::parse("https://api.paystack.co").expect("default Paystack base URL is valid")
}

/// Dummy gateway configuration for development and testing.
///
/// Initialization returns a canned redirect URL, and verification reports
/// `verify_status` for every reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyGatewayConfig {
    /// Webhook signing secret the dummy gateway verifies against
    pub secret: String,
    /// Transaction status `verify` reports (e.g., "success" or "failed")
    pub verify_status: String,
    /// Amount `verify` reports, in minor units
    pub amount: i64,
    /// Currency `verify` reports
    pub currency: String,
}

impl Default for DummyGatewayConfig {
    fn default() -> Self {
        Self {
            secret: "dummy-secret".to_string(),
            verify_status: "success".to_string(),
            amount: 3_990_000,
            currency: "NGN".to_string(),
        }
    }
}

/// Email configuration for transactional notifications.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
// Note: Cannot use deny_unknown_fields here due to #[serde(flatten)] on transport
pub struct EmailConfig {
    /// Email transport method
    #[serde(flatten)]
    pub transport: MailerConfig,
    /// Sender email address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: MailerConfig::File {
                path: "./emails".to_string(),
            },
            from_email: "no-reply@example.com".to_string(),
            from_name: "Subgate".to_string(),
        }
    }
}

/// Email transport configuration - a send API or files for testing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MailerConfig {
    /// Send emails through the Resend HTTP API
    Resend {
        /// Resend API key (starts with re_)
        api_key: String,
        /// API base URL; overridable for testing against a mock server
        #[serde(default = "default_resend_base_url")]
        base_url: Url,
    },
    /// Write emails to files (for development/testing)
    File {
        /// Directory path where email files will be written
        path: String,
    },
}

fn default_resend_base_url() -> Url {
    Url::parse("https://api.resend.com").expect("default Resend base URL is valid")
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("SUBGATE_").split("__"))
    }

    /// Reject configurations that would fail at runtime.
    pub fn validate(&self) -> Result<(), Error> {
        if self.subscription.amount <= 0 {
            return Err(Error::BadRequest {
                message: format!(
                    "Config validation: subscription.amount must be positive, got {}",
                    self.subscription.amount
                ),
            });
        }

        if self.subscription.currency.len() != 3 || !self.subscription.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::BadRequest {
                message: format!(
                    "Config validation: subscription.currency must be an ISO 4217 code, got {:?}",
                    self.subscription.currency
                ),
            });
        }

        if !self.admin_email.contains('@') {
            return Err(Error::BadRequest {
                message: format!("Config validation: admin_email {:?} is not an email address", self.admin_email),
            });
        }

        if let GatewayConfig::Paystack(paystack) = &self.gateway {
            if paystack.secret_key.is_empty() {
                return Err(Error::BadRequest {
                    message: "Config validation: gateway.paystack.secret_key must be set".to_string(),
                });
            }
        }

        if let MailerConfig::Resend { api_key, .. } = &self.email.transport {
            if api_key.is_empty() {
                return Err(Error::BadRequest {
                    message: "Config validation: email.resend.api_key must be set".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
