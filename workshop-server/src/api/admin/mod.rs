//! Admin API Module
//!
//! Order status and stock administration.

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::list_orders))
        .route("/orders/{id}/status", patch(handler::update_status))
        .route(
            "/stock",
            get(handler::list_stock).put(handler::upsert_stock),
        )
}
