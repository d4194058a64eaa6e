//! Admin API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::{Order, StockEntry, StockUpsert, UpdateOrderStatusRequest};

use crate::core::ServerState;
use crate::fulfillment::{inventory, queries, status};

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<ServerState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders =
        queries::admin_list_orders(state.ports.orders.as_ref(), query.status.as_deref()).await?;
    Ok(Json(orders))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = status::admin_update_status(
        state.ports.orders.as_ref(),
        id,
        &payload.status,
        state.config.status_policy(),
    )
    .await?;
    Ok(Json(order))
}

pub async fn list_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<StockEntry>>> {
    let entries = inventory::list_stock(state.ports.stock.as_ref()).await?;
    Ok(Json(entries))
}

pub async fn upsert_stock(
    State(state): State<ServerState>,
    Json(payload): Json<StockUpsert>,
) -> AppResult<Json<StockEntry>> {
    let entry = inventory::upsert_stock(state.ports.stock.as_ref(), payload).await?;
    Ok(Json(entry))
}
