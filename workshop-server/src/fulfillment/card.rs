//! Synchronous card payment
//!
//! Structural checks only; there is no real authorization. A card that
//! passes is recorded as paid through the same reconciler the webhook uses.

use super::ports::OrderStore;
use super::reconciler::{PaymentReconciler, ReconcileOutcome};
use crate::utils::validation::MAX_NAME_LEN;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CardPaymentRequest, OrderStatus, PAYMENT_METHOD_CARD, PaymentStatus};

fn invalid(field: &str, msg: &str) -> AppError {
    AppError::with_message(ErrorCode::PaymentInvalidCard, msg).with_detail("field", field)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Luhn checksum over an all-digit string
pub fn luhn_valid(number: &str) -> bool {
    let mut sum = 0u32;
    for (i, b) in number.bytes().rev().enumerate() {
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Validate card fields without touching any order
pub fn validate_card(req: &CardPaymentRequest, luhn_check: bool) -> AppResult<()> {
    let number = req.card_number.trim();
    if !all_digits(number) || !(12..=19).contains(&number.len()) {
        return Err(invalid("card_number", "card number must be 12-19 digits"));
    }
    if luhn_check && !luhn_valid(number) {
        return Err(invalid("card_number", "card number failed checksum"));
    }

    let cvv = req.cvv.trim();
    if !all_digits(cvv) || !(3..=4).contains(&cvv.len()) {
        return Err(invalid("cvv", "cvv must be 3 or 4 digits"));
    }

    let holder = req.cardholder.trim();
    if holder.is_empty() {
        return Err(invalid("cardholder", "cardholder required"));
    }
    if holder.len() > MAX_NAME_LEN {
        return Err(invalid("cardholder", "cardholder is too long"));
    }

    let month = req.expiry_month.trim();
    if !all_digits(month) || month.len() > 2 {
        return Err(invalid("expiry_month", "expiry month must be digits"));
    }
    if !matches!(month.parse::<u8>(), Ok(1..=12)) {
        return Err(invalid("expiry_month", "expiry month must be 1-12"));
    }

    let year = req.expiry_year.trim();
    if !all_digits(year) || !matches!(year.len(), 2 | 4) {
        return Err(invalid("expiry_year", "expiry year must be 2 or 4 digits"));
    }

    Ok(())
}

/// Pay an order by card. Only orders placed with the card method qualify.
pub async fn pay_by_card(
    orders: &dyn OrderStore,
    reconciler: &PaymentReconciler,
    req: &CardPaymentRequest,
    luhn_check: bool,
) -> AppResult<ReconcileOutcome> {
    validate_card(req, luhn_check)?;

    let order = orders
        .find_order(req.order_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", req.order_id)
        })?;

    if order.payment_method != PAYMENT_METHOD_CARD {
        return Err(AppError::with_message(
            ErrorCode::PaymentInvalidMethod,
            "order payment method is not card",
        )
        .with_detail("payment_method", order.payment_method));
    }
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order.id));
    }

    reconciler
        .process_payment_result(order.id, PaymentStatus::Paid, OrderStatus::Processing, None)
        .await
}
