//! Per-session cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart::CartItem;
use common::ProductId;
use serde::{Deserialize, Serialize};
use store::{CatalogStore, Store, TracingSink};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: uuid::Uuid,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total_cents: i64,
}

fn cart_response(items: &[CartItem], total_cents: i64) -> CartResponse {
    CartResponse {
        items: items
            .iter()
            .map(|i| CartItemResponse {
                product_id: i.product_id.to_string(),
                name: i.name.clone(),
                price_cents: i.price.cents(),
                quantity: i.quantity,
            })
            .collect(),
        total_cents,
    }
}

/// GET /cart — the caller's current cart.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CartResponse>, ApiError> {
    let caller = identity.require()?;
    let handle = state.carts.read().await.get(&caller.id).cloned();
    let response = match handle {
        Some(cart) => {
            let cart = cart.lock().await;
            cart_response(cart.items(), cart.total().cents())
        }
        None => cart_response(&[], 0),
    };
    Ok(Json(response))
}

/// POST /cart/items — add a product, reconciled against live stock.
#[tracing::instrument(skip(state, identity, req))]
pub async fn add_item<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let caller = identity.require()?;
    let product = state
        .store
        .product(ProductId::from_uuid(req.product_id))
        .await?;

    let handle = state.cart_handle(caller.id).await;
    let mut cart = handle.lock().await;
    cart.add(&state.store, &TracingSink, &product, req.quantity)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(cart_response(cart.items(), cart.total().cents())),
    ))
}

/// PUT /cart/items/:product_id — set an entry's quantity (min 1).
#[tracing::instrument(skip(state, identity, req))]
pub async fn update_item<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(product_id): Path<uuid::Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let caller = identity.require()?;
    let handle = state.cart_handle(caller.id).await;
    let mut cart = handle.lock().await;
    cart.update_quantity(ProductId::from_uuid(product_id), req.quantity);
    Ok(Json(cart_response(cart.items(), cart.total().cents())))
}

/// DELETE /cart/items/:product_id — drop one entry; no-op if absent.
#[tracing::instrument(skip(state, identity))]
pub async fn remove_item<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(product_id): Path<uuid::Uuid>,
) -> Result<Json<CartResponse>, ApiError> {
    let caller = identity.require()?;
    let handle = state.cart_handle(caller.id).await;
    let mut cart = handle.lock().await;
    cart.remove(ProductId::from_uuid(product_id));
    Ok(Json(cart_response(cart.items(), cart.total().cents())))
}

/// DELETE /cart — empty the caller's cart.
#[tracing::instrument(skip(state, identity))]
pub async fn clear<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<StatusCode, ApiError> {
    let caller = identity.require()?;
    state.carts.write().await.remove(&caller.id);
    Ok(StatusCode::NO_CONTENT)
}
