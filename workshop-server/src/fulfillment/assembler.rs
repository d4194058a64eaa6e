//! Order Assembler
//!
//! Validates a create-order request, prices every line, resolves the
//! purchasing identity and persists header and items atomically.

use super::Ports;
use super::pricing::{coerce_quantity, line_total, order_total, unit_price};
use super::production::{item_production_days, order_production_days};
use crate::db::repository::RepoError;
use crate::notify::{Notification, deliver_detached};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CreateOrderRequest, GuestCreate, Order, OrderItem, OrderStatus, PaymentStatus, User,
};
use shared::util::{now_millis, snowflake_id};

#[derive(Clone)]
pub struct OrderAssembler {
    ports: Ports,
}

impl OrderAssembler {
    pub fn new(ports: Ports) -> Self {
        Self { ports }
    }

    /// Create an order in `new` / `pending`.
    ///
    /// Any missing product aborts the whole order; nothing is written, guest
    /// users included, until every line has been priced.
    pub async fn assemble(&self, req: CreateOrderRequest) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        let payment_method = req.payment_method.trim().to_lowercase();
        if payment_method.is_empty() {
            return Err(AppError::new(ErrorCode::PaymentInvalidMethod));
        }
        if payment_method.len() > MAX_SHORT_TEXT_LEN {
            return Err(AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                "payment method is too long",
            ));
        }
        validate_optional_text(&req.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&req.address, "address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

        let guest_email = match req.user_id {
            Some(_) => None,
            None => Some(guest_email(&req)?),
        };

        let order_id = snowflake_id();
        let mut items = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let product = self
                .ports
                .products
                .find_product(line.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ProductNotFound,
                        format!("product {} not found", line.product_id),
                    )
                    .with_detail("product_id", line.product_id)
                })?;

            let quantity = coerce_quantity(line.quantity);
            let unit = unit_price(&product, &line.selected_options);
            items.push(OrderItem {
                id: 0,
                order_id,
                product_id: product.id,
                quantity,
                unit_price: unit,
                line_total: line_total(unit, quantity),
                calculated_production_time_days: item_production_days(
                    &product,
                    &line.selected_options,
                ),
                selected_options: line.selected_options.clone(),
            });
        }

        let user = self.resolve_identity(guest_email, &req).await?;

        // Plain read: concurrent orders may undercount the backlog
        let backlog = self
            .ports
            .orders
            .count_by_status(OrderStatus::InProduction)
            .await?;

        let now = now_millis();
        let order = Order {
            id: order_id,
            user_id: user.id,
            name: non_empty(&req.name).or_else(|| Some(user.name.clone())),
            email: Some(contact_email(&req, &user)),
            address: non_empty(&req.address).or_else(|| user.address.clone()),
            phone: non_empty(&req.phone).or_else(|| user.phone.clone()),
            status: OrderStatus::New,
            payment_status: PaymentStatus::Pending,
            payment_method,
            total_price: order_total(items.iter().map(|i| i.line_total)),
            estimated_production_time_days: order_production_days(
                items.iter().map(|i| i.calculated_production_time_days),
                backlog,
            ),
            created_at: now,
            updated_at: now,
            items,
        };

        self.ports.orders.create_with_items(&order).await?;

        tracing::info!(
            order_id = order.id,
            user_id = order.user_id,
            items = order.items.len(),
            total_price = order.total_price,
            estimated_days = order.estimated_production_time_days,
            backlog,
            "Order created"
        );

        deliver_detached(
            self.ports.notifier.clone(),
            contact_email(&req, &user),
            Notification::OrderCreated { order_id: order.id },
        );

        Ok(order)
    }

    /// Existing user by id, or get-or-create a guest by email
    async fn resolve_identity(
        &self,
        guest_email: Option<&str>,
        req: &CreateOrderRequest,
    ) -> AppResult<User> {
        let email = match (req.user_id, guest_email) {
            (Some(user_id), _) => {
                return self
                    .ports
                    .users
                    .find_user(user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id)
                    });
            }
            (None, Some(email)) => email,
            (None, None) => {
                return Err(AppError::required("email", "email required for guest orders"));
            }
        };

        if let Some(user) = self.ports.users.find_user_by_email(email).await? {
            return Ok(user);
        }

        let guest = GuestCreate {
            name: non_empty(&req.name).unwrap_or_default(),
            email: email.to_string(),
            address: non_empty(&req.address),
            phone: non_empty(&req.phone),
        };
        match self.ports.users.create_guest(&guest).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Guest user created");
                Ok(user)
            }
            // Lost a race with a concurrent checkout for the same email
            Err(RepoError::Duplicate(_)) => self
                .ports
                .users
                .find_user_by_email(email)
                .await?
                .ok_or_else(|| AppError::internal("could not create user")),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create guest user");
                Err(AppError::database("could not create user"))
            }
        }
    }
}

/// Trimmed, structurally valid email for a guest order
fn guest_email(req: &CreateOrderRequest) -> AppResult<&str> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::required("email", "email required for guest orders"))?;
    validate_email(email)?;
    Ok(email)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Address for order notifications: the one given with the order, else the
/// account's
fn contact_email(req: &CreateOrderRequest, user: &User) -> String {
    non_empty(&req.email).unwrap_or_else(|| user.email.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::UserRole;

    fn user() -> User {
        User {
            id: 9,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            address: None,
            phone: None,
            role: UserRole::Client,
            password_hash: String::new(),
            created_at: 0,
        }
    }

    #[test]
    fn test_contact_email_prefers_request() {
        let mut req = CreateOrderRequest::default();
        assert_eq!(contact_email(&req, &user()), "ana@example.com");
        req.email = Some("  ".into());
        assert_eq!(contact_email(&req, &user()), "ana@example.com");
        req.email = Some("other@example.com".into());
        assert_eq!(contact_email(&req, &user()), "other@example.com");
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(&Some(" Ana ".into())), Some("Ana".into()));
        assert_eq!(non_empty(&Some("".into())), None);
        assert_eq!(non_empty(&None), None);
    }
}
