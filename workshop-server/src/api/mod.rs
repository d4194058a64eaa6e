//! HTTP API
//!
//! - [`health`] - liveness and database ping
//! - [`orders`] - order placement, checkout and customer order views
//! - [`payments`] - card payments
//! - [`stripe_webhook`] - gateway payment events
//! - [`admin`] - order status and stock administration
//!
//! Identities are passed explicitly; authentication happens upstream.

pub mod admin;
pub mod health;
pub mod orders;
pub mod payments;
pub mod stripe_webhook;

use axum::Router;
use axum::routing::post;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Every route, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(admin::router())
        .route("/api/webhooks/stripe", post(stripe_webhook::handle_webhook))
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
