//! Stock Repository
//!
//! Quantities only ever change through single-statement updates, never
//! read-modify-write.

use super::RepoResult;
use shared::models::{StockEntry, StockUpsert};
use sqlx::SqlitePool;

/// Unit assigned when a decrement creates a row for an unknown material
pub const DEFAULT_UNIT: &str = "pcs";

const STOCK_SELECT: &str = "SELECT material_name, quantity_available, unit FROM stock";

/// Atomically add `delta` (negative to consume) to a material's quantity,
/// creating the row if the material is not tracked yet.
pub async fn adjust_quantity(pool: &SqlitePool, material: &str, delta: f64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO stock (material_name, quantity_available, unit, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(material_name) DO UPDATE SET quantity_available = quantity_available + excluded.quantity_available, updated_at = excluded.updated_at",
    )
    .bind(material)
    .bind(delta)
    .bind(DEFAULT_UNIT)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<StockEntry>> {
    let sql = format!("{STOCK_SELECT} ORDER BY material_name");
    let rows = sqlx::query_as::<_, StockEntry>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Set a material's quantity and unit outright
pub async fn upsert(pool: &SqlitePool, data: &StockUpsert) -> RepoResult<StockEntry> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO stock (material_name, quantity_available, unit, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(material_name) DO UPDATE SET quantity_available = excluded.quantity_available, unit = excluded.unit, updated_at = excluded.updated_at",
    )
    .bind(&data.material_name)
    .bind(data.quantity_available)
    .bind(&data.unit)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(StockEntry {
        material_name: data.material_name.clone(),
        quantity_available: data.quantity_available,
        unit: data.unit.clone(),
    })
}
