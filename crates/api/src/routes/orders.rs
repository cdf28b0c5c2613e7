//! Checkout and order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{AddressId, OrderId};
use domain::{Order, OrderItem, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{OrderStore, Store};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub address_id: Option<uuid::Uuid>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub total_cents: i64,
    pub status: String,
    pub stock_restored: bool,
    pub address_id: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub stock_restored: bool,
}

#[derive(Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id.to_string(),
            user_id: o.user_id.to_string(),
            total_cents: o.total.cents(),
            status: o.status.to_string(),
            stock_restored: o.stock_restored,
            address_id: o.address_id.map(|a| a.to_string()),
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id.to_string(),
            product_id: i.product_id.to_string(),
            quantity: i.quantity,
            price_cents: i.price.cents(),
            stock_restored: i.stock_restored,
        }
    }
}

/// POST /checkout — place an order from the caller's cart.
#[tracing::instrument(skip(state, identity, req))]
pub async fn checkout<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let caller = identity.require()?;
    let address_id = req.address_id.map(AddressId::from_uuid);

    // Lock only this user's cart for the duration of placement; the cart
    // registry itself is released before any store I/O starts.
    let handle = state.cart_handle(caller.id).await;
    let mut cart = handle.lock().await;
    let order = state
        .checkout
        .place_order(Some(&caller), &mut cart, address_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders — the caller's own orders, newest first.
#[tracing::instrument(skip(state, identity))]
pub async fn list<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let caller = identity.require()?;
    let orders = state.lifecycle.orders(&caller).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /admin/orders — every order, for the admin console.
#[tracing::instrument(skip(state, identity))]
pub async fn list_all<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let caller = identity.require()?;
    let orders = state.lifecycle.all_orders(&caller).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /orders/:id — one order with its line items.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let caller = identity.require()?;
    let order_id = OrderId::from_uuid(id);
    let order = state.lifecycle.order(&caller, order_id).await?;
    let items = state.store.order_items(order_id).await?;
    Ok(Json(OrderDetailResponse {
        order: order.into(),
        items: items.into_iter().map(Into::into).collect(),
    }))
}

/// POST /orders/:id/cancel — cancel, restoring stock at most once.
#[tracing::instrument(skip(state, identity))]
pub async fn cancel<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let caller = identity.require()?;
    let order = state
        .lifecycle
        .cancel(&caller, OrderId::from_uuid(id))
        .await?;
    Ok(Json(order.into()))
}

/// PUT /orders/:id/status — move an order along the lifecycle. Admin only;
/// `force: true` engages the non-linear escape hatch.
#[tracing::instrument(skip(state, identity, req))]
pub async fn update_status<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let caller = identity.require()?;
    let to: OrderStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown status: {}", req.status)))?;

    let order_id = OrderId::from_uuid(id);
    let order = if req.force {
        state.lifecycle.force_status(&caller, order_id, to).await?
    } else {
        state.lifecycle.update_status(&caller, order_id, to).await?
    };
    Ok(Json(order.into()))
}

/// DELETE /orders/:id — hard delete, cascading to items. Admin only.
#[tracing::instrument(skip(state, identity))]
pub async fn delete<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<StatusCode, ApiError> {
    let caller = identity.require()?;
    state
        .lifecycle
        .delete(&caller, OrderId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
