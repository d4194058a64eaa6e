//! Payment event ledger
//!
//! One row per applied payment result. The primary key on `event_key` makes
//! claiming a key an atomic first-writer-wins operation.

use super::RepoResult;
use sqlx::SqlitePool;

/// Record `key` as processed. Returns `false` if it was already claimed.
pub async fn claim(pool: &SqlitePool, key: &str, order_id: i64, kind: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "INSERT INTO payment_events (event_key, order_id, kind, received_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT (event_key) DO NOTHING",
    )
    .bind(key)
    .bind(order_id)
    .bind(kind)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop a claim so a retried delivery can apply it
pub async fn release(pool: &SqlitePool, key: &str) -> RepoResult<()> {
    sqlx::query("DELETE FROM payment_events WHERE event_key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}
