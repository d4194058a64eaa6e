//! Order fulfillment and payment reconciliation
//!
//! - [`pricing`] / [`production`]: pure calculations over a preloaded product
//! - [`assembler`]: turns a cart-like request into a persisted order
//! - [`status`]: order status rules and the admin status write
//! - [`reconciler`]: applies payment results exactly once
//! - [`card`]: synchronous card payment path
//! - [`checkout`]: hosted checkout sessions for card orders
//! - [`queries`] / [`inventory`]: customer and admin read paths, stock levels

pub mod assembler;
pub mod card;
pub mod checkout;
pub mod inventory;
pub mod ports;
pub mod pricing;
pub mod production;
pub mod queries;
pub mod reconciler;
pub mod status;

pub use assembler::OrderAssembler;
pub use reconciler::{PaymentReconciler, ReconcileOutcome};
pub use status::StatusPolicy;

use crate::db::{DbService, SqliteStore};
use crate::notify::Notifier;
use ports::{OrderStore, PaymentEventLog, ProductLookup, StockStore, UserStore};
use std::sync::Arc;

/// Collaborators shared by the fulfillment services
#[derive(Clone)]
pub struct Ports {
    pub products: Arc<dyn ProductLookup>,
    pub users: Arc<dyn UserStore>,
    pub orders: Arc<dyn OrderStore>,
    pub stock: Arc<dyn StockStore>,
    pub payment_events: Arc<dyn PaymentEventLog>,
    pub notifier: Arc<dyn Notifier>,
}

impl Ports {
    /// Every store backed by the same SQLite pool
    pub fn sqlite(db: &DbService, notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::new(SqliteStore::new(db));
        Self {
            products: store.clone(),
            users: store.clone(),
            orders: store.clone(),
            stock: store.clone(),
            payment_events: store,
            notifier,
        }
    }
}
