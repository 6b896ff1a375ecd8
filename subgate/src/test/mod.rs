pub mod utils;

use serde_json::json;

use crate::{
    config::{DummyGatewayConfig, GatewayConfig, PaystackConfig},
    email::EmailMessage,
};
use utils::{MemoryNotifier, settle, sign, test_app, test_app_with, test_config, wait_for_emails};

const DUMMY_SECRET: &str = "dummy-secret";

fn subscribe_body() -> serde_json::Value {
    json!({
        "name": "Ada Obi",
        "email": "ada@example.com",
        "phone": "+2348012345678",
        "bodyGoals": "strength and mobility",
        "referralName": "Chidi"
    })
}

fn email_to<'a>(emails: &'a [EmailMessage], to: &str) -> &'a EmailMessage {
    emails
        .iter()
        .find(|m| m.to == to)
        .unwrap_or_else(|| panic!("no email sent to {to}; got {:?}", emails.iter().map(|m| &m.to).collect::<Vec<_>>()))
}

#[test_log::test(tokio::test)]
async fn test_health_endpoint() {
    // Through Application::new, so config wiring is exercised too
    let app = crate::Application::new(test_config()).expect("Failed to create application");
    let server = app.into_test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[test_log::test(tokio::test)]
async fn test_subscribe_initializes_checkout_and_notifies() {
    let app = test_app();

    let response = app.server.post("/api/subscribe").json(&subscribe_body()).await;
    assert_eq!(response.status_code().as_u16(), 200);

    let body: serde_json::Value = response.json();
    let reference = body["reference"].as_str().expect("response has reference");
    assert!(reference.starts_with("dummy_"));
    let redirect_url = body["redirectUrl"].as_str().expect("response has redirectUrl");
    assert!(redirect_url.contains(reference));

    // The gateway saw the configured product, not anything client-supplied
    let initialized = app.gateway.initialized();
    assert_eq!(initialized.len(), 1);
    assert_eq!(initialized[0].email, "ada@example.com");
    assert_eq!(initialized[0].amount, 3_990_000);
    assert_eq!(initialized[0].currency, "NGN");
    assert_eq!(initialized[0].metadata.name, "Ada Obi");
    assert_eq!(initialized[0].metadata.body_goals.as_deref(), Some("strength and mobility"));

    let emails = wait_for_emails(&app.notifier, 2).await;

    let payer = email_to(&emails, "ada@example.com");
    assert_eq!(payer.subject, "Complete your Monthly Coaching subscription");
    assert!(payer.html.contains(redirect_url));
    assert!(payer.html.contains("₦39,900.00"));

    let admin = email_to(&emails, "admin@test.com");
    assert_eq!(admin.subject, "New subscription: Ada Obi");
    assert!(admin.html.contains("+2348012345678"));
    assert!(admin.html.contains("Chidi"));
}

#[test_log::test(tokio::test)]
async fn test_subscribe_rejects_missing_field() {
    let app = test_app();

    // No phone key at all: the request fails deserialization
    let response = app
        .server
        .post("/api/subscribe")
        .json(&json!({
            "name": "Ada Obi",
            "email": "ada@example.com"
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 422);
    assert!(app.gateway.initialized().is_empty(), "Gateway should not be called");
}

#[test_log::test(tokio::test)]
async fn test_subscribe_rejects_blank_fields() {
    let app = test_app();

    let mut body = subscribe_body();
    body["phone"] = json!("   ");

    let response = app.server.post("/api/subscribe").json(&body).await;
    assert_eq!(response.status_code().as_u16(), 400);

    assert!(app.gateway.initialized().is_empty(), "Gateway should not be called");
    assert!(settle(&app.notifier).await.is_empty(), "No emails for a rejected request");
}

#[test_log::test(tokio::test)]
async fn test_webhook_rejects_missing_signature() {
    let app = test_app();
    let body = json!({"event": "charge.success", "data": {"reference": "ref_1"}}).to_string();

    let response = app.server.post("/api/webhook/paystack").text(body).await;

    assert_eq!(response.status_code().as_u16(), 400);
    let json_body: serde_json::Value = response.json();
    assert_eq!(json_body["error"], "invalid signature");

    assert!(app.gateway.verified_references().is_empty(), "Unverified events must not be processed");
    assert!(settle(&app.notifier).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_webhook_rejects_bad_signature() {
    let app = test_app();
    let body = json!({"event": "charge.success", "data": {"reference": "ref_1"}}).to_string();
    let signature = sign("not-the-secret", &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body.clone())
        .await;

    assert_eq!(response.status_code().as_u16(), 400);
    assert!(app.gateway.verified_references().is_empty());

    // A bad digest and a missing header are indistinguishable to the caller
    let missing = app.server.post("/api/webhook/paystack").text(body).await;
    assert_eq!(missing.status_code(), response.status_code());
    assert_eq!(missing.text(), response.text());
}

#[test_log::test(tokio::test)]
async fn test_webhook_acknowledges_malformed_payload() {
    let app = test_app();
    let body = "this is not json";
    let signature = sign(DUMMY_SECRET, body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    // Signed garbage gets a 200 so the gateway does not retry it forever
    assert_eq!(response.status_code().as_u16(), 200);
    let json_body: serde_json::Value = response.json();
    assert_eq!(json_body["received"], true);
    assert!(app.gateway.verified_references().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_charge_success_verifies_then_notifies() {
    let app = test_app();
    let body = json!({
        "event": "charge.success",
        "data": {
            "reference": "ref_7f2k",
            "status": "success",
            "amount": 3990000,
            "currency": "NGN",
            "customer": {"email": "ada@example.com", "first_name": "Ada", "last_name": "Obi"},
            "authorization": {"card_type": "visa", "last4": "4081"}
        }
    })
    .to_string();
    let signature = sign(DUMMY_SECRET, &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code().as_u16(), 200);
    let json_body: serde_json::Value = response.json();
    assert_eq!(json_body["received"], true);

    // Status came from re-verification, not from the webhook body
    assert_eq!(app.gateway.verified_references(), vec!["ref_7f2k".to_string()]);

    let emails = wait_for_emails(&app.notifier, 2).await;

    let payer = email_to(&emails, "ada@example.com");
    assert_eq!(payer.subject, "Payment confirmed");
    assert!(payer.html.contains("Hello Ada Obi,"));
    assert!(payer.html.contains("ref_7f2k"));
    assert!(payer.html.contains("₦39,900.00"));
    assert!(payer.html.contains("visa •••• 4081"));

    let admin = email_to(&emails, "admin@test.com");
    assert_eq!(admin.subject, "Payment received: ₦39,900.00");
    assert!(admin.html.contains("ada@example.com"));
    assert!(admin.html.contains("ref_7f2k"));
}

#[test_log::test(tokio::test)]
async fn test_charge_success_not_confirmed_sends_nothing() {
    let config = crate::Config {
        gateway: GatewayConfig::Dummy(DummyGatewayConfig {
            verify_status: "failed".to_string(),
            ..Default::default()
        }),
        ..test_config()
    };
    let app = test_app_with(config, MemoryNotifier::new());

    let body = json!({
        "event": "charge.success",
        "data": {
            "reference": "ref_forged",
            "status": "success",
            "customer": {"email": "ada@example.com"}
        }
    })
    .to_string();
    let signature = sign(DUMMY_SECRET, &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code().as_u16(), 200);
    assert_eq!(app.gateway.verified_references(), vec!["ref_forged".to_string()]);
    assert!(settle(&app.notifier).await.is_empty(), "Unconfirmed charges must not produce emails");
}

#[test_log::test(tokio::test)]
async fn test_charge_success_without_reference_acknowledged() {
    let app = test_app();
    let body = json!({"event": "charge.success", "data": {"status": "success"}}).to_string();
    let signature = sign(DUMMY_SECRET, &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    // Handler error is logged, the gateway still gets its 200
    assert_eq!(response.status_code().as_u16(), 200);
    assert!(app.gateway.verified_references().is_empty());
    assert!(settle(&app.notifier).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_charge_failed_notifies_payer() {
    let app = test_app();
    let body = json!({
        "event": "charge.failed",
        "data": {
            "reference": "ref_dead",
            "amount": 3990000,
            "currency": "NGN",
            "gateway_response": "Insufficient funds",
            "customer": {"email": "ada@example.com", "first_name": "Ada"}
        }
    })
    .to_string();
    let signature = sign(DUMMY_SECRET, &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code().as_u16(), 200);
    // Failure events are not re-verified
    assert!(app.gateway.verified_references().is_empty());

    let emails = wait_for_emails(&app.notifier, 1).await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "ada@example.com");
    assert_eq!(emails[0].subject, "Your payment could not be completed");
    assert!(emails[0].html.contains("Insufficient funds"));
    assert!(emails[0].html.contains("₦39,900.00"));
}

#[test_log::test(tokio::test)]
async fn test_subscription_events_acknowledged_without_email() {
    let app = test_app();

    for event in ["subscription.create", "subscription.disable", "invoice.create"] {
        let body = json!({"event": event, "data": {}}).to_string();
        let signature = sign(DUMMY_SECRET, &body);

        let response = app
            .server
            .post("/api/webhook/paystack")
            .add_header("x-paystack-signature", signature)
            .text(body)
            .await;

        assert_eq!(response.status_code().as_u16(), 200, "{event} should be acknowledged");
    }

    assert!(app.gateway.verified_references().is_empty());
    assert!(settle(&app.notifier).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_notifier_outage_never_blocks_acknowledgement() {
    let app = test_app_with(test_config(), MemoryNotifier::failing());

    let body = json!({
        "event": "charge.success",
        "data": {
            "reference": "ref_7f2k",
            "customer": {"email": "ada@example.com"}
        }
    })
    .to_string();
    let signature = sign(DUMMY_SECRET, &body);

    let response = app
        .server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code().as_u16(), 200);
    let json_body: serde_json::Value = response.json();
    assert_eq!(json_body["received"], true);
}

/// Full journey against a mocked Paystack: subscribe, then receive and
/// process the signed charge.success webhook for the same reference.
#[test_log::test(tokio::test)]
async fn test_e2e_paystack_checkout_and_webhook() {
    use std::sync::Arc;

    let mock_server = wiremock::MockServer::start().await;

    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/transaction/initialize"))
        .and(wiremock::matchers::header("authorization", "Bearer sk_test_abc"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/e2e123",
                "reference": "ref_e2e"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/transaction/verify/ref_e2e"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Verification successful",
            "data": {
                "status": "success",
                "reference": "ref_e2e",
                "amount": 3990000,
                "currency": "NGN",
                "paid_at": "2024-01-15T10:30:00.000Z",
                "gateway_response": "Successful",
                "channel": "card",
                "customer": {"email": "ada@example.com", "first_name": "Ada", "last_name": "Obi"},
                "authorization": {"card_type": "visa", "last4": "4081"}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.gateway = GatewayConfig::Paystack(PaystackConfig {
        secret_key: "sk_test_abc".to_string(),
        public_key: "pk_test_abc".to_string(),
        base_url: mock_server.uri().parse().expect("mock server URL parses"),
    });

    let notifier = Arc::new(MemoryNotifier::new());
    let state = crate::AppState {
        gateway: crate::gateway::create_gateway(&config.gateway),
        config: Arc::new(config),
        notifier: notifier.clone(),
    };
    let server = axum_test::TestServer::new(crate::build_router(state)).expect("Failed to create test server");

    // Step 1: subscriber submits the form
    let response = server.post("/api/subscribe").json(&subscribe_body()).await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["redirectUrl"], "https://checkout.paystack.com/e2e123");
    assert_eq!(body["reference"], "ref_e2e");

    let emails = wait_for_emails(&notifier, 2).await;
    assert!(email_to(&emails, "ada@example.com").html.contains("https://checkout.paystack.com/e2e123"));

    // Step 2: the gateway delivers the signed success webhook
    let webhook_body = json!({
        "event": "charge.success",
        "data": {"reference": "ref_e2e", "status": "success"}
    })
    .to_string();
    let signature = sign("sk_test_abc", &webhook_body);

    let response = server
        .post("/api/webhook/paystack")
        .add_header("x-paystack-signature", signature)
        .text(webhook_body)
        .await;
    assert_eq!(response.status_code().as_u16(), 200);

    // Confirmation details come from the verify response, not the webhook
    let emails = wait_for_emails(&notifier, 4).await;
    let confirmation = emails
        .iter()
        .find(|m| m.to == "ada@example.com" && m.subject == "Payment confirmed")
        .expect("payer confirmation email");
    assert!(confirmation.html.contains("ref_e2e"));
    assert!(confirmation.html.contains("₦39,900.00"));
    assert!(confirmation.html.contains("15 January 2024"));
    assert!(confirmation.html.contains("visa •••• 4081"));

    let receipt = emails
        .iter()
        .find(|m| m.to == "admin@test.com" && m.subject.starts_with("Payment received"))
        .expect("admin receipt email");
    assert!(receipt.html.contains("Ada Obi"));
}
