//! Transactional email templates.
//!
//! One builder per (recipient, scenario) pair. Builders are pure: they take
//! already-formatted strings (amounts via [`crate::money::format_amount`])
//! and return a ready-to-send [`EmailMessage`].

use chrono::{DateTime, Utc};

use crate::email::EmailMessage;

/// To the payer, right after checkout initialization: the hosted-payment link.
pub fn subscription_initiated(to: &str, name: &str, plan_name: &str, amount: &str, payment_link: &str) -> EmailMessage {
    let greeting = greeting(Some(name));
    let body = layout(
        "Complete your subscription",
        &format!(
            r#"<p>{greeting}</p>

        <p>You're one step away from starting your <strong>{plan_name}</strong> subscription ({amount}).</p>

        <p>To complete your payment, click the link below:</p>

        <p><a href="{payment_link}">Complete payment</a></p>

        <p>Or copy and paste this link into your browser:</p>
        <p>{payment_link}</p>"#
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Complete your {plan_name} subscription"),
        html: body,
    }
}

/// To the admin: a new subscription came in through the form.
pub fn new_subscription(to: &str, name: &str, email: &str, phone: &str, goals: Option<&str>, referral: Option<&str>) -> EmailMessage {
    let goals = goals.unwrap_or("—");
    let referral = referral.unwrap_or("—");
    let body = layout(
        "New subscription",
        &format!(
            r#"<p>A new subscriber just started checkout:</p>

        <ul>
            <li><strong>Name:</strong> {name}</li>
            <li><strong>Email:</strong> {email}</li>
            <li><strong>Phone:</strong> {phone}</li>
            <li><strong>Goals:</strong> {goals}</li>
            <li><strong>Referred by:</strong> {referral}</li>
        </ul>"#
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("New subscription: {name}"),
        html: body,
    }
}

/// To the payer, after a verified successful charge: the receipt.
pub fn payment_confirmed(
    to: &str,
    name: Option<&str>,
    plan_name: &str,
    amount: &str,
    reference: &str,
    paid_at: Option<DateTime<Utc>>,
    card: Option<&str>,
) -> EmailMessage {
    let greeting = greeting(name);
    let paid_at = paid_at.map(|t| t.format("%-d %B %Y").to_string()).unwrap_or_else(|| "—".to_string());
    let card = card.unwrap_or("—");
    let body = layout(
        "Payment confirmed",
        &format!(
            r#"<p>{greeting}</p>

        <p>Your payment for <strong>{plan_name}</strong> has been confirmed. Welcome aboard!</p>

        <ul>
            <li><strong>Amount:</strong> {amount}</li>
            <li><strong>Reference:</strong> {reference}</li>
            <li><strong>Date:</strong> {paid_at}</li>
            <li><strong>Card:</strong> {card}</li>
        </ul>

        <p>Keep this email for your records.</p>"#
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Payment confirmed".to_string(),
        html: body,
    }
}

/// To the admin: a verified payment landed.
pub fn payment_received(to: &str, payer_email: &str, payer_name: Option<&str>, amount: &str, reference: &str) -> EmailMessage {
    let payer_name = payer_name.unwrap_or("—");
    let body = layout(
        "Payment received",
        &format!(
            r#"<p>A payment was received and verified:</p>

        <ul>
            <li><strong>From:</strong> {payer_name} ({payer_email})</li>
            <li><strong>Amount:</strong> {amount}</li>
            <li><strong>Reference:</strong> {reference}</li>
        </ul>"#
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Payment received: {amount}"),
        html: body,
    }
}

/// To the payer, after a failed charge: the reason and what to do next.
pub fn payment_failed(to: &str, name: Option<&str>, amount: &str, reason: &str) -> EmailMessage {
    let greeting = greeting(name);
    let body = layout(
        "Payment failed",
        &format!(
            r#"<p>{greeting}</p>

        <p>Unfortunately your payment of {amount} could not be completed.</p>

        <p><strong>Reason:</strong> {reason}</p>

        <p>A few things that usually fix this:</p>
        <ul>
            <li>Check that your card has sufficient funds.</li>
            <li>Confirm your bank allows online and international payments.</li>
            <li>Try a different card or payment channel.</li>
        </ul>

        <p>You can restart your subscription at any time by submitting the form again.</p>"#
        ),
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Your payment could not be completed".to_string(),
        html: body,
    }
}

fn greeting(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => format!("Hello {},", name.trim()),
        _ => "Hello,".to_string(),
    }
}

fn layout(title: &str, inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>{title}</h2>

        {inner}

        <div class="footer">
            <p>This is an automated message, please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#
    )
}
