//! Order API Module
//!
//! Order placement plus the customer's own order views.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::create))
        .route("/api/orders/{id}/checkout", post(handler::checkout))
        .route("/api/users/{user_id}/orders", get(handler::list_for_user))
        .route(
            "/api/users/{user_id}/orders/{order_id}",
            get(handler::get_for_user),
        )
}
