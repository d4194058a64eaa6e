//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::{CreateOrderRequest, CreateOrderResponse, Order, PAYMENT_METHOD_CARD};

use crate::core::ServerState;
use crate::fulfillment::{checkout, queries};

/// Body for re-issuing a checkout session
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: i64,
}

/// Place an order. Card orders answer with a hosted checkout URL.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let order = state.assembler.assemble(payload).await?;

    if order.payment_method == PAYMENT_METHOD_CARD {
        let response = checkout::start_checkout(state.checkout.as_ref(), &order).await?;
        return Ok(Json(response));
    }
    Ok(Json(CreateOrderResponse::placed(&order)))
}

/// New checkout session for an unpaid order
pub async fn checkout(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let response = checkout::pay_existing_order(
        state.ports.orders.as_ref(),
        state.checkout.as_ref(),
        payload.user_id,
        id,
    )
    .await?;
    Ok(Json(response))
}

pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = queries::list_user_orders(state.ports.orders.as_ref(), user_id).await?;
    Ok(Json(orders))
}

pub async fn get_for_user(
    State(state): State<ServerState>,
    Path((user_id, order_id)): Path<(i64, i64)>,
) -> AppResult<Json<Order>> {
    let order = queries::get_user_order(state.ports.orders.as_ref(), user_id, order_id).await?;
    Ok(Json(order))
}
