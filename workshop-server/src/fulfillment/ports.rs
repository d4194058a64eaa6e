//! Collaborator interfaces consumed by the fulfillment core
//!
//! The SQLite implementations live in [`crate::db::SqliteStore`]; tests can
//! substitute their own.

use crate::db::repository::RepoResult;
use crate::notify::BoxError;
use async_trait::async_trait;
use shared::models::{
    GuestCreate, Order, OrderStatus, PaymentStatus, Product, StockEntry, StockUpsert, User,
};

/// Resolve a product with its options preloaded
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product(&self, id: i64) -> RepoResult<Option<Product>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> RepoResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Fails with `RepoError::Duplicate` if the email is already taken
    async fn create_guest(&self, data: &GuestCreate) -> RepoResult<User>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist header and items atomically
    async fn create_with_items(&self, order: &Order) -> RepoResult<()>;

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>>;

    async fn find_with_items(&self, id: i64) -> RepoResult<Option<Order>>;

    async fn list_by_user(&self, user_id: i64) -> RepoResult<Vec<Order>>;

    async fn list_all(&self, status: Option<OrderStatus>) -> RepoResult<Vec<Order>>;

    async fn update_status(&self, id: i64, status: OrderStatus) -> RepoResult<()>;

    async fn update_payment_status(&self, id: i64, status: PaymentStatus) -> RepoResult<()>;

    async fn count_by_status(&self, status: OrderStatus) -> RepoResult<i64>;
}

#[async_trait]
pub trait StockStore: Send + Sync {
    /// Must be atomic at the storage layer
    async fn adjust_quantity(&self, material: &str, delta: f64) -> RepoResult<()>;

    async fn list_stock(&self) -> RepoResult<Vec<StockEntry>>;

    /// Set an absolute level, creating the material if needed
    async fn upsert_stock(&self, data: &StockUpsert) -> RepoResult<StockEntry>;
}

/// Ledger of applied payment results
#[async_trait]
pub trait PaymentEventLog: Send + Sync {
    /// `true` the first time a key is claimed, `false` on every repeat
    async fn claim(&self, key: &str, order_id: i64, kind: &str) -> RepoResult<bool>;

    async fn release(&self, key: &str) -> RepoResult<()>;
}

/// Hosted checkout provider
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Open a payment session for the order and return the redirect URL
    async fn create_session(&self, order: &Order) -> Result<String, BoxError>;
}
