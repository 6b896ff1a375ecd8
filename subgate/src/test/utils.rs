//! Test utilities for integration testing

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum_test::TestServer;

use crate::{
    AppState, build_router,
    config::{Config, DummyGatewayConfig, GatewayConfig},
    email::{EmailMessage, MailerError, Notifier},
    gateway::dummy::DummyGateway,
    webhooks::signing,
};

/// Notifier that captures messages in memory instead of sending them.
///
/// Can be flipped into a failing mode to simulate a provider outage.
pub struct MemoryNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// A notifier whose every send fails.
    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    /// Messages captured so far, in send order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("memory notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: &EmailMessage) -> crate::email::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailerError::Api("simulated provider outage".to_string()));
        }
        self.sent.lock().expect("memory notifier lock poisoned").push(message.clone());
        Ok(())
    }
}

/// A running test server plus handles to observe what it did.
pub struct TestApp {
    pub server: TestServer,
    pub gateway: Arc<DummyGateway>,
    pub notifier: Arc<MemoryNotifier>,
}

pub fn test_config() -> Config {
    // Use temp directory for test emails
    let temp_dir = std::env::temp_dir().join(format!("subgate-test-emails-{}", std::process::id()));

    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        ..Default::default()
    };
    config.email.transport = crate::config::MailerConfig::File {
        path: temp_dir.to_string_lossy().into_owned(),
    };
    config
}

pub fn test_app() -> TestApp {
    test_app_with(test_config(), MemoryNotifier::new())
}

pub fn test_app_with(config: Config, notifier: MemoryNotifier) -> TestApp {
    let dummy_config = match &config.gateway {
        GatewayConfig::Dummy(c) => c.clone(),
        GatewayConfig::Paystack(_) => DummyGatewayConfig::default(),
    };
    let gateway = Arc::new(DummyGateway::new(dummy_config));
    let notifier = Arc::new(notifier);

    let state = AppState {
        config: Arc::new(config),
        gateway: gateway.clone(),
        notifier: notifier.clone(),
    };
    let server = TestServer::new(build_router(state)).expect("Failed to create test server");

    TestApp {
        server,
        gateway,
        notifier,
    }
}

/// Hex HMAC signature for a webhook body, as the gateway would send it.
pub fn sign(secret: &str, body: &str) -> String {
    signing::sign_payload(secret.as_bytes(), body.as_bytes())
}

/// Poll until `n` emails have been captured; sends run on spawned tasks.
pub async fn wait_for_emails(notifier: &MemoryNotifier, n: usize) -> Vec<EmailMessage> {
    for _ in 0..200 {
        let sent = notifier.sent();
        if sent.len() >= n {
            return sent;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {} emails, got {} after polling", n, notifier.sent().len());
}

/// Let spawned send tasks run, then return whatever was captured.
pub async fn settle(notifier: &MemoryNotifier) -> Vec<EmailMessage> {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    notifier.sent()
}
