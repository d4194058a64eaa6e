//! Stripe integration via REST API (no SDK dependency)
//!
//! - hosted checkout sessions for card orders
//! - webhook signature verification
//! - mapping of webhook events to payment results

use crate::fulfillment::ports::CheckoutGateway;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::*;
use serde::Deserialize;
use sha2::Sha256;
use shared::models::{Order, OrderStatus, PaymentStatus};

pub use crate::notify::BoxError;

/// Checkout session settings
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub ttl_minutes: i64,
    /// Base for the success/cancel redirect URLs
    pub frontend_base_url: String,
}

/// Thin Stripe REST client
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a one-off payment Checkout Session for an order, returning its URL
    pub async fn create_checkout_session(
        &self,
        order: &Order,
        settings: &CheckoutSettings,
    ) -> Result<String, BoxError> {
        let form = checkout_form(order, settings, chrono::Utc::now().timestamp());
        let resp: serde_json::Value = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        resp["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
    }
}

/// Stripe-hosted checkout bound to this deployment's settings
#[derive(Clone)]
pub struct StripeCheckout {
    client: StripeClient,
    settings: CheckoutSettings,
}

impl StripeCheckout {
    pub fn new(client: StripeClient, settings: CheckoutSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckout {
    async fn create_session(&self, order: &Order) -> Result<String, BoxError> {
        self.client
            .create_checkout_session(order, &self.settings)
            .await
    }
}

/// Order total in minor currency units
pub fn amount_minor_units(total: f64) -> i64 {
    (Decimal::from_f64(total).unwrap_or_default() * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Form body for `POST /v1/checkout/sessions`
pub fn checkout_form(
    order: &Order,
    settings: &CheckoutSettings,
    now_secs: i64,
) -> Vec<(String, String)> {
    let base = settings.frontend_base_url.trim_end_matches('/');
    let id = order.id.to_string();
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("line_items[0][quantity]".into(), "1".into()),
        (
            "line_items[0][price_data][currency]".into(),
            settings.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            amount_minor_units(order.total_price).to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".into(),
            format!("Order #{id}"),
        ),
        ("client_reference_id".into(), id.clone()),
        ("metadata[order_id]".into(), id.clone()),
        ("payment_intent_data[metadata][order_id]".into(), id.clone()),
        (
            "expires_at".into(),
            (now_secs + settings.ttl_minutes * 60).to_string(),
        ),
        (
            "success_url".into(),
            format!("{base}/payment/success?session_id={{CHECKOUT_SESSION_ID}}&order_id={id}"),
        ),
        (
            "cancel_url".into(),
            format!("{base}/payment/cancel?order_id={id}"),
        ),
    ];
    if let Some(email) = order.email.as_deref().filter(|e| !e.is_empty()) {
        form.push(("customer_email".into(), email.to_string()));
    }
    form
}

// ==================== Webhooks ====================

/// Verify a Stripe webhook signature (HMAC-SHA256) against the current time
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> Result<(), &'static str> {
    verify_signature_at(
        payload,
        sig_header,
        secret,
        tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
}

/// Verify a Stripe webhook signature as of `now_secs`
pub fn verify_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now_secs: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now_secs - ts).abs() > tolerance_secs {
        return Err("Webhook timestamp outside tolerance");
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Several v1 entries are sent while a signing secret is being rolled
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    Ok(())
}

/// Minimal view of a Stripe event
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// Payment outcome carried by a webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentResult {
    pub order_id: i64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
}

/// Target statuses for a webhook event type, `None` for types we ignore
pub fn statuses_for_event(event_type: &str) -> Option<(PaymentStatus, OrderStatus)> {
    match event_type {
        "payment_intent.succeeded" | "checkout.session.completed" => {
            Some((PaymentStatus::Paid, OrderStatus::Processing))
        }
        "payment_intent.payment_failed" => Some((PaymentStatus::Declined, OrderStatus::Cancelled)),
        "checkout.session.expired" => Some((PaymentStatus::Cancelled, OrderStatus::Cancelled)),
        _ => None,
    }
}

fn as_order_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Order id from `metadata.order_id`, falling back to `client_reference_id`
pub fn order_id_of(object: &serde_json::Value) -> Option<i64> {
    as_order_id(&object["metadata"]["order_id"])
        .or_else(|| as_order_id(&object["client_reference_id"]))
}

impl StripeEvent {
    /// Payment result for this event, if it is one we reconcile
    pub fn payment_result(&self) -> Option<PaymentResult> {
        let (payment_status, order_status) = statuses_for_event(&self.event_type)?;
        // A completed session for a delayed payment method is not paid yet
        if self.event_type == "checkout.session.completed"
            && self.data.object["payment_status"]
                .as_str()
                .is_some_and(|s| s != "paid")
        {
            return None;
        }
        let order_id = order_id_of(&self.data.object)?;
        Some(PaymentResult {
            order_id,
            payment_status,
            order_status,
        })
    }
}
