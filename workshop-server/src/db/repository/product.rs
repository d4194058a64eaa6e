//! Product Repository (read-only)

use super::RepoResult;
use shared::models::{Product, ProductOption};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str =
    "SELECT id, name, base_price, base_production_time_days, material FROM products";

const OPTION_SELECT: &str = "SELECT id, product_id, option_type, name, price_modifier_type, price_modifier_value, production_time_modifier_days, production_time_modifier_percent FROM product_options";

/// Load a product with its full option set
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let Some(mut product) = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    product.options = find_options(pool, id).await?;
    Ok(Some(product))
}

pub async fn find_options(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<ProductOption>> {
    let sql = format!("{OPTION_SELECT} WHERE product_id = ? ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, ProductOption>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
