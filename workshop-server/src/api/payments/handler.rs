use axum::{Json, extract::State};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CardPaymentRequest, CardPaymentResponse};

use crate::core::ServerState;
use crate::fulfillment::{ReconcileOutcome, card};

/// Synchronous card payment
pub async fn pay_by_card(
    State(state): State<ServerState>,
    Json(payload): Json<CardPaymentRequest>,
) -> AppResult<Json<CardPaymentResponse>> {
    let outcome = card::pay_by_card(
        state.ports.orders.as_ref(),
        &state.reconciler,
        &payload,
        state.config.card_luhn_check,
    )
    .await?;

    if outcome == ReconcileOutcome::Duplicate {
        tracing::info!(order_id = payload.order_id, "Card payment already applied");
    }

    let order = state
        .ports
        .orders
        .find_order(payload.order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    Ok(Json(CardPaymentResponse {
        order_id: order.id,
        payment_status: order.payment_status,
        status: order.status,
    }))
}
