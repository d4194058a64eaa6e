//! Stock Model

use serde::{Deserialize, Serialize};

/// Material stock entry, keyed by material name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub material_name: String,
    pub quantity_available: f64,
    pub unit: String,
}

/// Admin payload for setting a material's stock level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpsert {
    pub material_name: String,
    pub quantity_available: f64,
    pub unit: String,
}
