//! Core module - configuration, state, server lifecycle
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared services for request handlers
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, EmailBackend};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
