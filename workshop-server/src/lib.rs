//! Workshop Server - made-to-order workshop backend
//!
//! Prices configurable products, estimates production time, records orders
//! and reconciles payment results into order status, stock consumption and
//! customer notifications.
//!
//! ```text
//! workshop-server/src/
//! ├── core/          # config, state, server lifecycle
//! ├── fulfillment/   # pricing, production, assembly, status, payments
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── notify/        # log and SES notifiers
//! ├── stripe/        # hosted checkout and webhook verification
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod fulfillment;
pub mod notify;
pub mod stripe;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use db::DbService;
pub use fulfillment::{OrderAssembler, PaymentReconciler, ReconcileOutcome, StatusPolicy};
pub use shared::error::{AppError, AppResult, ErrorCode};
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
