//! Production Time Estimator
//!
//! Item estimate: base days, then for each matched option in selection order
//! add its fixed days and, when it carries a percent, immediately rescale
//! the running total. Never below one day.
//!
//! Order estimate: the slowest item plus a surcharge for the current
//! in-production backlog.

use super::pricing::to_decimal;
use rust_decimal::prelude::*;
use shared::models::{Product, SelectedOption};

/// Minimum estimate for any item
pub const MIN_PRODUCTION_DAYS: i64 = 1;

/// Backlog thresholds (orders in production) and the days they add
const BACKLOG_HEAVY: i64 = 10;
const BACKLOG_HEAVY_DAYS: i64 = 3;
const BACKLOG_BUSY: i64 = 5;
const BACKLOG_BUSY_DAYS: i64 = 1;

/// `round(days * (1 + percent / 100))`, halves away from zero
fn scale_days(days: i64, percent: f64) -> i64 {
    let factor = Decimal::ONE + to_decimal(percent) / Decimal::ONE_HUNDRED;
    (Decimal::from(days) * factor)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(days)
}

/// Estimated production days for one line item
pub fn item_production_days(product: &Product, selected: &[SelectedOption]) -> i64 {
    let mut days = product.base_production_time_days;

    for sel in selected {
        let Some(opt) = product.find_option(sel.id) else {
            continue;
        };
        days += opt.production_time_modifier_days;
        if let Some(percent) = opt.production_time_modifier_percent {
            days = scale_days(days, percent);
        }
    }

    days.max(MIN_PRODUCTION_DAYS)
}

/// Extra days for the given number of orders currently in production
pub fn backlog_surcharge(in_production: i64) -> i64 {
    if in_production >= BACKLOG_HEAVY {
        BACKLOG_HEAVY_DAYS
    } else if in_production >= BACKLOG_BUSY {
        BACKLOG_BUSY_DAYS
    } else {
        0
    }
}

/// Order-level estimate from the item estimates and the backlog count
pub fn order_production_days(item_days: impl IntoIterator<Item = i64>, in_production: i64) -> i64 {
    let slowest = item_days
        .into_iter()
        .max()
        .unwrap_or(MIN_PRODUCTION_DAYS)
        .max(MIN_PRODUCTION_DAYS);
    slowest + backlog_surcharge(in_production)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::pricing::tests::{option, product, select};
    use shared::models::PriceModifierType;

    #[test]
    fn test_base_days_without_options() {
        assert_eq!(item_production_days(&product(100.0, 10), &[]), 10);
    }

    #[test]
    fn test_fixed_days_are_added() {
        let mut p = product(500.0, 10);
        p.options = vec![option(1, PriceModifierType::Absolute, 100.0, 3, None)];
        assert_eq!(item_production_days(&p, &[select(1)]), 13);
    }

    #[test]
    fn test_percent_compounds_at_point_of_selection() {
        let mut p = product(100.0, 10);
        p.options = vec![
            option(1, PriceModifierType::Absolute, 0.0, 0, Some(50.0)),
            option(2, PriceModifierType::Absolute, 0.0, 2, None),
        ];
        // 10 * 1.5 = 15, + 2 = 17
        assert_eq!(item_production_days(&p, &[select(1), select(2)]), 17);
        // (10 + 2) * 1.5 = 18
        assert_eq!(item_production_days(&p, &[select(2), select(1)]), 18);
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        let mut p = product(100.0, 5);
        p.options = vec![option(1, PriceModifierType::Absolute, 0.0, 0, Some(10.0))];
        // 5 * 1.1 = 5.5 -> 6
        assert_eq!(item_production_days(&p, &[select(1)]), 6);
    }

    #[test]
    fn test_never_below_one_day() {
        let mut p = product(100.0, 2);
        p.options = vec![
            option(1, PriceModifierType::Absolute, 0.0, -10, None),
            option(2, PriceModifierType::Absolute, 0.0, 0, Some(-100.0)),
        ];
        assert_eq!(item_production_days(&p, &[select(1)]), 1);
        assert_eq!(item_production_days(&p, &[select(2)]), 1);
    }

    #[test]
    fn test_non_finite_percent_leaves_days_unscaled() {
        let mut p = product(100.0, 5);
        p.options = vec![option(1, PriceModifierType::Absolute, 0.0, 0, Some(f64::NAN))];
        assert_eq!(item_production_days(&p, &[select(1)]), 5);
    }

    #[test]
    fn test_unmatched_options_do_not_change_days() {
        let p = product(100.0, 4);
        assert_eq!(item_production_days(&p, &[select(42)]), 4);
    }

    #[test]
    fn test_backlog_surcharge_thresholds() {
        assert_eq!(backlog_surcharge(0), 0);
        assert_eq!(backlog_surcharge(4), 0);
        assert_eq!(backlog_surcharge(5), 1);
        assert_eq!(backlog_surcharge(9), 1);
        assert_eq!(backlog_surcharge(10), 3);
        assert_eq!(backlog_surcharge(250), 3);
    }

    #[test]
    fn test_order_estimate_is_slowest_item_plus_surcharge() {
        assert_eq!(order_production_days([13], 6), 14);
        assert_eq!(order_production_days([4, 13, 9], 0), 13);
        assert_eq!(order_production_days([4, 13, 9], 12), 16);
    }
}
