//! # subgate: subscription payments and notifications
//!
//! `subgate` is the payment-notification backend for a subscription web
//! application. It sits between the subscription form, a hosted-checkout
//! payment gateway, and a transactional email provider, and does three
//! things:
//!
//! - **Checkout initiation** (`POST /api/subscribe`): validates the form,
//!   initializes a hosted-checkout payment with the gateway, and returns the
//!   redirect URL the frontend sends the customer to.
//! - **Webhook verification and dispatch** (`POST /api/webhook/paystack`):
//!   authenticates the gateway's asynchronous callbacks with an HMAC over
//!   the raw body, then routes each event to a handler by kind. Successful
//!   charges are re-verified against the gateway's authoritative status
//!   endpoint before anything is trusted.
//! - **Notifications**: templated HTML emails (payer confirmations and
//!   failures, admin alerts) sent best-effort on spawned tasks, so email
//!   provider latency or outages never affect a payment acknowledgement.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). There is no
//! database: each request is processed statelessly and the gateway remains
//! the source of truth for payment state. The gateway and the email provider
//! sit behind the [`gateway::PaymentGateway`] and [`email::Notifier`] traits;
//! which implementation backs them is decided by configuration
//! ([`config::GatewayConfig`], [`config::MailerConfig`]), with dummy/file
//! implementations for development and tests.
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use subgate::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = subgate::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     subgate::telemetry::init_telemetry();
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};

pub mod api;
pub mod config;
pub mod email;
pub mod errors;
pub mod gateway;
pub mod money;
pub mod telemetry;
pub mod webhooks;

#[cfg(test)]
mod test;

pub use config::Config;
use email::Notifier;
use gateway::PaymentGateway;

/// Shared handles every request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/subscribe", post(api::handlers::subscriptions::subscribe))
        .route("/webhook/paystack", post(api::handlers::webhooks::gateway_webhook));

    Router::new()
        .route("/health", get(api::handlers::health))
        .nest("/api", api_routes)
        .with_state(state)
        // The subscription form posts from the browser, potentially from a
        // different origin than this service
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The configured application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Wire up the gateway and notifier from config and build the router.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting subgate with configuration: {:#?}", config);

        let gateway = gateway::create_gateway(&config.gateway);
        let notifier = email::create_notifier(&config.email)?;

        let state = AppState {
            config: Arc::new(config.clone()),
            gateway,
            notifier,
        };
        let router = build_router(state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("subgate listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
