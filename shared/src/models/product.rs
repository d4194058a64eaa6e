//! Product Model
//!
//! Products are read-only to the fulfillment core: the catalog is managed
//! elsewhere, orders only resolve them by id with their options preloaded.

use serde::{Deserialize, Serialize};

/// Kind of customer choice an option represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OptionType {
    Color,
    Size,
    Material,
    Extra,
}

/// How an option's price modifier is applied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PriceModifierType {
    /// Adds a fixed amount to the running price
    Absolute,
    /// Multiplies the running price by `1 + value / 100`
    Percent,
}

/// Product entity with its ordered option set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub base_price: f64,
    pub base_production_time_days: i64,
    /// Stock material consumed by this product
    pub material: String,
    /// Options (loaded separately, ordered by sort_order)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

impl Product {
    /// Find one of this product's options by id
    pub fn find_option(&self, option_id: i64) -> Option<&ProductOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// A selectable option belonging to exactly one product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductOption {
    pub id: i64,
    pub product_id: i64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub name: String,
    pub price_modifier_type: PriceModifierType,
    pub price_modifier_value: f64,
    pub production_time_modifier_days: i64,
    pub production_time_modifier_percent: Option<f64>,
}
