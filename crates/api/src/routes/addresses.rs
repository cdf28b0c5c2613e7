//! Saved shipping address endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use common::AddressId;
use domain::Address;
use serde::{Deserialize, Serialize};
use store::{AddressStore, Store};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct AddressRequest {
    /// Present when updating an existing address.
    pub id: Option<uuid::Uuid>,
    pub full_name: String,
    pub phone: String,
    pub pincode: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub pincode: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub is_default: bool,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            id: a.id.to_string(),
            full_name: a.full_name,
            phone: a.phone,
            pincode: a.pincode,
            address_line: a.address_line,
            city: a.city,
            state: a.state,
            is_default: a.is_default,
        }
    }
}

/// GET /addresses — the caller's saved addresses, default first.
#[tracing::instrument(skip(state, identity))]
pub async fn list<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<AddressResponse>>, ApiError> {
    let caller = identity.require()?;
    let addresses = state.store.addresses_for_user(caller.id).await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

/// GET /addresses/default — the caller's default address, if any.
#[tracing::instrument(skip(state, identity))]
pub async fn default<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Option<AddressResponse>>, ApiError> {
    let caller = identity.require()?;
    let address = state.store.default_address(caller.id).await?;
    Ok(Json(address.map(Into::into)))
}

/// POST /addresses — create or update a saved address. Setting
/// `is_default` clears any prior default transactionally.
#[tracing::instrument(skip(state, identity, req))]
pub async fn upsert<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<AddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), ApiError> {
    let caller = identity.require()?;

    let address = Address {
        id: req.id.map(AddressId::from_uuid).unwrap_or_default(),
        user_id: caller.id,
        full_name: req.full_name,
        phone: req.phone,
        pincode: req.pincode,
        address_line: req.address_line,
        city: req.city,
        state: req.state,
        is_default: req.is_default,
        created_at: Utc::now(),
    };
    address
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Updating someone else's address must not be possible.
    if req.id.is_some() {
        let existing = state.store.address(address.id).await?;
        if existing.user_id != caller.id {
            return Err(ApiError::NotFound(format!("address {} not found", address.id)));
        }
    }

    let saved = state.store.upsert_address(address).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}
