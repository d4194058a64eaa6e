//! Data models
//!
//! Shared between the workshop server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids.

pub mod order;
pub mod product;
pub mod stock;
pub mod user;

// Re-exports
pub use order::*;
pub use product::*;
pub use stock::*;
pub use user::*;
