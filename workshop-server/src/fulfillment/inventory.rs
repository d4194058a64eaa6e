//! Material stock administration

use super::ports::StockStore;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use shared::error::{AppError, AppResult};
use shared::models::{StockEntry, StockUpsert};

pub async fn list_stock(stock: &dyn StockStore) -> AppResult<Vec<StockEntry>> {
    Ok(stock.list_stock().await?)
}

/// Set a material's level. Names and units are stored trimmed.
pub async fn upsert_stock(stock: &dyn StockStore, data: StockUpsert) -> AppResult<StockEntry> {
    let data = normalize(data)?;
    let entry = stock.upsert_stock(&data).await?;
    tracing::info!(
        material = %entry.material_name,
        quantity = entry.quantity_available,
        unit = %entry.unit,
        "Stock level set"
    );
    Ok(entry)
}

fn normalize(data: StockUpsert) -> AppResult<StockUpsert> {
    let material_name = data.material_name.trim().to_string();
    let unit = data.unit.trim().to_string();
    validate_required_text(&material_name, "material_name", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&unit, "unit", MAX_SHORT_TEXT_LEN)?;

    if !data.quantity_available.is_finite() || data.quantity_available < 0.0 {
        return Err(AppError::validation("quantity_available must be >= 0")
            .with_detail("field", "quantity_available"));
    }

    Ok(StockUpsert {
        material_name,
        quantity_available: data.quantity_available,
        unit,
    })
}
