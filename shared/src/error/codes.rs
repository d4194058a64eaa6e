//! Unified error codes for the workshop services
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 3xxx: Identity errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product and stock errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can match on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 2xxx: Permission ====================
    /// Caller does not own the resource
    PermissionDenied = 2001,

    // ==================== 3xxx: Identity ====================
    /// User not found
    UserNotFound = 3001,
    /// Email already registered
    UserEmailExists = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already paid
    OrderAlreadyPaid = 4002,
    /// Order has no items
    OrderEmpty = 4007,
    /// Status value is not one of the known order statuses
    OrderInvalidStatus = 4008,
    /// Status change is not allowed from the current status
    OrderInvalidTransition = 4009,

    // ==================== 5xxx: Payment ====================
    /// Payment failed
    PaymentFailed = 5001,
    /// Payment method missing or unsupported
    PaymentInvalidMethod = 5003,
    /// Card fields are malformed
    PaymentInvalidCard = 5006,
    /// Checkout session could not be created
    PaymentSetupFailed = 5007,
    /// Webhook signature header missing or invalid
    WebhookSignatureInvalid = 5101,
    /// Webhook payload could not be parsed
    WebhookPayloadInvalid = 5102,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Stock entry not found
    StockNotFound = 6401,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Notification could not be delivered
    NotificationFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Identity
            ErrorCode::UserNotFound => "invalid user",
            ErrorCode::UserEmailExists => "Email already registered",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderEmpty => "items required",
            ErrorCode::OrderInvalidStatus => "Invalid order status",
            ErrorCode::OrderInvalidTransition => "Order status transition not allowed",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::PaymentInvalidMethod => "payment method required",
            ErrorCode::PaymentInvalidCard => "Invalid card details",
            ErrorCode::PaymentSetupFailed => "Failed to create checkout session",
            ErrorCode::WebhookSignatureInvalid => "Invalid webhook signature",
            ErrorCode::WebhookPayloadInvalid => "Invalid webhook payload",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::StockNotFound => "Stock entry not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Identity
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::UserEmailExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidStatus),
            4009 => Ok(ErrorCode::OrderInvalidTransition),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5006 => Ok(ErrorCode::PaymentInvalidCard),
            5007 => Ok(ErrorCode::PaymentSetupFailed),
            5101 => Ok(ErrorCode::WebhookSignatureInvalid),
            5102 => Ok(ErrorCode::WebhookPayloadInvalid),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6401 => Ok(ErrorCode::StockNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NotificationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
