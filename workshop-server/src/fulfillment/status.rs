//! Order status rules
//!
//! ```text
//! new -> processing -> in_production -> shipped -> delivered
//!  \________\_______________\-> cancelled
//! ```
//!
//! The admin status write always checks that the target is a known status.
//! Whether it also enforces the edges above depends on [`StatusPolicy`].

use super::ports::OrderStore;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus};

/// How strictly admin status writes follow the transition graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any known status is accepted; non-adjacent moves are logged
    #[default]
    Permissive,
    /// Only edges of the transition graph (or a no-op) are accepted
    Strict,
}

/// Whether `from -> to` is an edge of the transition graph. Staying in the
/// same status is always allowed.
pub fn is_allowed_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    from == to
        || matches!(
            (from, to),
            (New, Processing)
                | (Processing, InProduction)
                | (InProduction, Shipped)
                | (Shipped, Delivered)
                | (New | Processing | InProduction, Cancelled)
        )
}

/// Parse an admin-supplied status value
pub fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::from_db(raw.trim()).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::OrderInvalidStatus,
            format!("invalid status: {raw}"),
        )
        .with_detail("status", raw)
    })
}

/// Set an order's status on behalf of an administrator.
///
/// Unknown values are rejected before the order is read, so the order is
/// untouched.
pub async fn admin_update_status(
    orders: &dyn OrderStore,
    order_id: i64,
    raw_status: &str,
    policy: StatusPolicy,
) -> AppResult<Order> {
    let target = parse_status(raw_status)?;

    let order = orders
        .find_order(order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?;

    if !is_allowed_transition(order.status, target) {
        match policy {
            StatusPolicy::Strict => {
                return Err(AppError::with_message(
                    ErrorCode::OrderInvalidTransition,
                    format!("cannot move order from {} to {}", order.status, target),
                )
                .with_detail("from", order.status.as_db())
                .with_detail("to", target.as_db()));
            }
            StatusPolicy::Permissive => {
                tracing::warn!(
                    order_id,
                    from = %order.status,
                    to = %target,
                    "Non-adjacent order status change"
                );
            }
        }
    }

    orders.update_status(order_id, target).await?;
    tracing::info!(order_id, from = %order.status, to = %target, "Order status updated");

    orders
        .find_order(order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))
}
