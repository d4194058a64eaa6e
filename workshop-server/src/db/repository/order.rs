//! Order Repository

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::SqlitePool;
use sqlx::types::Json;

const ORDER_SELECT: &str = "SELECT id, user_id, name, email, address, phone, status, payment_status, payment_method, total_price, estimated_production_time_days, created_at, updated_at FROM orders";

const ITEM_SELECT: &str = "SELECT id, order_id, product_id, quantity, unit_price, line_total, calculated_production_time_days, selected_options FROM order_items";

/// Insert the order header and every item in one transaction.
/// Item ids are assigned by SQLite; `item.id` is ignored.
pub async fn create_with_items(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, user_id, name, email, address, phone, status, payment_status, payment_method, total_price, estimated_production_time_days, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.name)
    .bind(&order.email)
    .bind(&order.address)
    .bind(&order.phone)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(&order.payment_method)
    .bind(order.total_price)
    .bind(order.estimated_production_time_days)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, line_total, calculated_production_time_days, selected_options, position) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.line_total)
        .bind(item.calculated_production_time_days)
        .bind(Json(&item.selected_options))
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE order_id = ? ORDER BY position");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_with_items(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let Some(mut order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    order.items = find_items(pool, id).await?;
    Ok(Some(order))
}

/// A user's orders, newest first (headers only)
pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// All orders, newest first, optionally filtered by status
pub async fn list_all(pool: &SqlitePool, status: Option<OrderStatus>) -> RepoResult<Vec<Order>> {
    let rows = match status {
        Some(status) => {
            let sql = format!("{ORDER_SELECT} WHERE status = ? ORDER BY created_at DESC, id DESC");
            sqlx::query_as::<_, Order>(&sql)
                .bind(status)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{ORDER_SELECT} ORDER BY created_at DESC, id DESC");
            sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?
        }
    };
    Ok(rows)
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn update_payment_status(
    pool: &SqlitePool,
    id: i64,
    payment_status: PaymentStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(payment_status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn count_by_status(pool: &SqlitePool, status: OrderStatus) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?")
        .bind(status)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
