//! Payment Reconciler
//!
//! Applies a payment outcome to an order: payment status, order status and,
//! on success, stock consumption and a confirmation message.
//!
//! Every call is keyed. The gateway event id is used when there is one,
//! otherwise `order:{id}:{payment_status}`. A key that was already applied
//! makes the call a no-op. Paid side effects carry a second, per-order key so
//! two different gateway events reporting the same payment consume stock
//! once. Status writes are not gated by that key: the latest distinct event
//! always wins.

use super::Ports;
use crate::notify::{Notification, deliver};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus, PaymentStatus};
use std::collections::BTreeMap;

/// Result of a reconciliation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Status written and side effects triggered
    Applied,
    /// Status written; paid side effects were already applied by another event
    StatusOnly,
    /// Same result was already applied; nothing changed
    Duplicate,
}

#[derive(Clone)]
pub struct PaymentReconciler {
    ports: Ports,
}

fn delivery_key(order_id: i64, payment_status: PaymentStatus, event_key: Option<&str>) -> String {
    match event_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => key.to_string(),
        None => format!("order:{order_id}:{payment_status}"),
    }
}

fn paid_effects_key(order_id: i64) -> String {
    format!("order:{order_id}:paid-effects")
}

impl PaymentReconciler {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    /// Apply `payment_status` / `order_status` to an order.
    ///
    /// A `paid` result moves the order on to `in_production`. Writes that
    /// fail release the claimed keys so a redelivery can try again.
    pub async fn process_payment_result(
        &self,
        order_id: i64,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
        event_key: Option<&str>,
    ) -> AppResult<ReconcileOutcome> {
        let order = self
            .ports
            .orders
            .find_with_items(order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
            })?;

        let key = delivery_key(order_id, payment_status, event_key);
        let mut claimed = Vec::with_capacity(2);

        if !self.claim(&key, order_id, payment_status).await? {
            tracing::info!(order_id, key = %key, "Duplicate payment result ignored");
            return Ok(ReconcileOutcome::Duplicate);
        }
        claimed.push(key.clone());

        let mut run_paid_effects = payment_status == PaymentStatus::Paid;
        if run_paid_effects {
            let effects_key = paid_effects_key(order_id);
            if effects_key != key {
                match self.claim(&effects_key, order_id, payment_status).await {
                    Ok(true) => claimed.push(effects_key),
                    Ok(false) => {
                        tracing::info!(
                            order_id,
                            key = %key,
                            "Paid side effects already applied by another event"
                        );
                        run_paid_effects = false;
                    }
                    Err(e) => {
                        self.release_all(&claimed).await;
                        return Err(e);
                    }
                }
            }
        }

        if let Err(e) = self
            .write_statuses(order_id, payment_status, order_status)
            .await
        {
            self.release_all(&claimed).await;
            return Err(e);
        }

        tracing::info!(
            order_id,
            payment_status = %payment_status,
            order_status = %order_status,
            key = %key,
            "Payment result applied"
        );

        if payment_status == PaymentStatus::Paid {
            if !run_paid_effects {
                return Ok(ReconcileOutcome::StatusOnly);
            }
            self.consume_stock(&order).await;
            self.notify_owner(&order, Notification::PaymentSucceeded { order_id })
                .await;
        } else if payment_status.is_failure() {
            self.notify_owner(&order, Notification::PaymentFailed { order_id })
                .await;
        }

        Ok(ReconcileOutcome::Applied)
    }

    async fn claim(&self, key: &str, order_id: i64, status: PaymentStatus) -> AppResult<bool> {
        Ok(self
            .ports
            .payment_events
            .claim(key, order_id, status.as_db())
            .await?)
    }

    async fn release_all(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.ports.payment_events.release(key).await {
                tracing::error!(key = %key, error = %e, "Failed to release payment event claim");
            }
        }
    }

    async fn write_statuses(
        &self,
        order_id: i64,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
    ) -> AppResult<()> {
        let orders = &self.ports.orders;
        orders.update_payment_status(order_id, payment_status).await?;
        orders.update_status(order_id, order_status).await?;
        if payment_status == PaymentStatus::Paid && order_status != OrderStatus::InProduction {
            orders
                .update_status(order_id, OrderStatus::InProduction)
                .await?;
        }
        Ok(())
    }

    /// Decrement each material by the total quantity ordered. Items whose
    /// product no longer resolves are skipped and logged.
    async fn consume_stock(&self, order: &Order) {
        let mut per_material: BTreeMap<String, i64> = BTreeMap::new();

        for item in &order.items {
            match self.ports.products.find_product(item.product_id).await {
                Ok(Some(product)) => {
                    *per_material.entry(product.material).or_default() += item.quantity;
                }
                Ok(None) => {
                    tracing::warn!(
                        order_id = order.id,
                        product_id = item.product_id,
                        quantity = item.quantity,
                        "Product missing, stock decrement skipped"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        order_id = order.id,
                        product_id = item.product_id,
                        error = %e,
                        "Product lookup failed, stock decrement skipped"
                    );
                }
            }
        }

        for (material, quantity) in per_material {
            if material.trim().is_empty() {
                tracing::warn!(order_id = order.id, "Product has no material, stock decrement skipped");
                continue;
            }
            match self
                .ports
                .stock
                .adjust_quantity(&material, -(quantity as f64))
                .await
            {
                Ok(()) => {
                    tracing::info!(order_id = order.id, material = %material, quantity, "Stock consumed");
                }
                Err(e) => {
                    tracing::error!(
                        order_id = order.id,
                        material = %material,
                        quantity,
                        error = %e,
                        "Stock decrement failed"
                    );
                }
            }
        }
    }

    async fn notify_owner(&self, order: &Order, notification: Notification) {
        let email = match self.ports.users.find_user(order.user_id).await {
            Ok(Some(user)) => Some(user.email),
            Ok(None) => order.email.clone(),
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Owner lookup failed");
                order.email.clone()
            }
        };
        match email {
            Some(to) => deliver(self.ports.notifier.as_ref(), &to, notification).await,
            None => tracing::warn!(order_id = order.id, "No address for payment notification"),
        }
    }
}
