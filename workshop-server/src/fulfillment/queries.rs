//! Read-side order operations

use super::ports::OrderStore;
use super::status::parse_status;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Order;

/// A user's orders, newest first
pub async fn list_user_orders(orders: &dyn OrderStore, user_id: i64) -> AppResult<Vec<Order>> {
    Ok(orders.list_by_user(user_id).await?)
}

/// One of the user's orders with its items
pub async fn get_user_order(
    orders: &dyn OrderStore,
    user_id: i64,
    order_id: i64,
) -> AppResult<Order> {
    let order = orders
        .find_with_items(order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?;

    if order.user_id != user_id {
        tracing::warn!(order_id, user_id, "Order requested by a different user");
        return Err(AppError::permission_denied("order belongs to another user"));
    }
    Ok(order)
}

/// All orders, newest first, optionally filtered by a raw status value
pub async fn admin_list_orders(
    orders: &dyn OrderStore,
    status: Option<&str>,
) -> AppResult<Vec<Order>> {
    let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };
    Ok(orders.list_all(status).await?)
}
