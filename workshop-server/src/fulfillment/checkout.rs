//! Hosted checkout for card orders

use super::ports::{CheckoutGateway, OrderStore};
use super::queries::get_user_order;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CreateOrderResponse, Order, PaymentStatus};

/// Open a checkout session for a freshly placed or still unpaid order
pub async fn start_checkout(
    gateway: &dyn CheckoutGateway,
    order: &Order,
) -> AppResult<CreateOrderResponse> {
    let checkout_url = gateway.create_session(order).await.map_err(|e| {
        tracing::error!(order_id = order.id, error = %e, "Checkout session creation failed");
        AppError::new(ErrorCode::PaymentSetupFailed).with_detail("order_id", order.id)
    })?;

    tracing::info!(order_id = order.id, "Checkout session created");
    Ok(CreateOrderResponse::Checkout {
        order_id: order.id,
        checkout_url,
        estimated_production_time_days: order.estimated_production_time_days,
    })
}

/// Re-issue a checkout session for one of the user's unpaid orders
pub async fn pay_existing_order(
    orders: &dyn OrderStore,
    gateway: &dyn CheckoutGateway,
    user_id: i64,
    order_id: i64,
) -> AppResult<CreateOrderResponse> {
    let order = get_user_order(orders, user_id, order_id).await?;
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order.id));
    }
    start_checkout(gateway, &order).await
}
