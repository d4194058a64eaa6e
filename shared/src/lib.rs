//! Shared types for the workshop services
//!
//! Domain models and the unified error system used by the server and any
//! client of its HTTP API.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
