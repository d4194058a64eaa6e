//! Stripe webhook handler
//!
//! POST /api/webhooks/stripe - raw body for signature verification

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::core::ServerState;
use crate::stripe::{self, StripeEvent};

/// Handle incoming Stripe webhook events
///
/// Signature and parse failures answer 400. Failures while applying a
/// verified event are logged and the event is still acknowledged.
pub async fn handle_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let sig_header = match headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            tracing::warn!("Missing Stripe-Signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    if let Err(e) = stripe::verify_webhook_signature(
        &body,
        sig_header,
        &state.config.stripe_webhook_secret,
        state.config.webhook_tolerance_secs,
    ) {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    let event: StripeEvent = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Received Stripe webhook");

    let Some(result) = event.payment_result() else {
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook event ignored");
        return StatusCode::OK;
    };

    match state
        .reconciler
        .process_payment_result(
            result.order_id,
            result.payment_status,
            result.order_status,
            Some(&event.id),
        )
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                event_id = %event.id,
                order_id = result.order_id,
                ?outcome,
                "Webhook payment result processed"
            );
        }
        Err(e) => {
            tracing::error!(
                event_id = %event.id,
                order_id = result.order_id,
                error = %e,
                "Webhook payment result failed"
            );
        }
    }

    StatusCode::OK
}
