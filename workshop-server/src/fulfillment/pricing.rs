//! Line Item Price Calculator
//!
//! Unit price = base price with each selected option's modifier applied in
//! selection order. Option ids that do not belong to the product are ignored.
//!
//! Uses rust_decimal for the arithmetic; results are stored as f64 rounded
//! to cents.

use rust_decimal::prelude::*;
use shared::models::{PriceModifierType, Product, SelectedOption};

/// Monetary values are rounded to 2 decimal places, half away from zero
const DECIMAL_PLACES: u32 = 2;

// ==================== Conversion Helpers ====================

/// Convert f64 to Decimal for calculation. Non-finite or out-of-range
/// values count as zero and are logged.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::warn!(value = ?value, "Non-finite f64 in price calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

// ==================== Calculation ====================

/// Quantities below 1 are treated as 1
#[inline]
pub fn coerce_quantity(quantity: i64) -> i64 {
    quantity.max(1)
}

fn unit_price_decimal(product: &Product, selected: &[SelectedOption]) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let mut price = to_decimal(product.base_price);

    for sel in selected {
        let Some(opt) = product.find_option(sel.id) else {
            continue;
        };
        let value = to_decimal(opt.price_modifier_value);
        price = match opt.price_modifier_type {
            PriceModifierType::Absolute => price + value,
            PriceModifierType::Percent => price * (Decimal::ONE + value / hundred),
        };
    }

    price.max(Decimal::ZERO)
}

/// Unit price for one product with the given selection, never negative
pub fn unit_price(product: &Product, selected: &[SelectedOption]) -> f64 {
    to_f64(unit_price_decimal(product, selected))
}

/// Line total for `quantity` units (quantity is coerced first)
pub fn line_total(unit_price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(coerce_quantity(quantity)))
}

/// Sum of line totals
pub fn order_total(line_totals: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(line_totals.into_iter().map(to_decimal).sum())
}
