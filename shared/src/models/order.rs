//! Order Model
//!
//! Orders own their items: both are written together, exactly once, and only
//! `status` / `payment_status` change afterwards.

use super::product::OptionType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order fulfillment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    New,
    Processing,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        Self::New,
        Self::Processing,
        Self::InProduction,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "processing" => Some(Self::Processing),
            "in_production" => Some(Self::InProduction),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Processing => "processing",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Declined,
    Cancelled,
}

impl PaymentStatus {
    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "declined" => Some(Self::Declined),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }

    /// Declined or cancelled
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Declined | Self::Cancelled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

/// Payment method that goes through hosted card checkout
pub const PAYMENT_METHOD_CARD: &str = "card";

/// Option chosen for a line item. Pricing resolves by `id` only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedOption {
    pub id: i64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub total_price: f64,
    pub estimated_production_time_days: i64,
    pub created_at: i64,
    pub updated_at: i64,
    /// Line items (loaded separately)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
    pub calculated_production_time_days: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub selected_options: Vec<SelectedOption>,
}

// ============================================================================
// Request / response payloads
// ============================================================================

/// Requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

/// Create order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub payment_method: String,
}

/// Create order response
///
/// Card orders get a hosted checkout URL instead of the order summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CreateOrderResponse {
    Checkout {
        order_id: i64,
        checkout_url: String,
        estimated_production_time_days: i64,
    },
    Placed {
        order_id: i64,
        total_price: f64,
        estimated_production_time_days: i64,
        status: OrderStatus,
        payment_status: PaymentStatus,
    },
}

impl CreateOrderResponse {
    pub fn placed(order: &Order) -> Self {
        Self::Placed {
            order_id: order.id,
            total_price: order.total_price,
            estimated_production_time_days: order.estimated_production_time_days,
            status: order.status,
            payment_status: order.payment_status,
        }
    }
}

/// Admin status update payload. The status is kept as a raw string so
/// unknown values can be reported as a conflict rather than a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Synchronous card payment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPaymentRequest {
    pub order_id: i64,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub cardholder: String,
    #[serde(default)]
    pub expiry_month: String,
    #[serde(default)]
    pub expiry_year: String,
}

/// Card payment result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardPaymentResponse {
    pub order_id: i64,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
}
