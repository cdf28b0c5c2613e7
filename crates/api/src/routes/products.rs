//! Catalog browsing and admin product CRUD.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{ProductId, Role};
use domain::{Money, Product, ProductPatch};
use serde::{Deserialize, Serialize};
use store::{CatalogStore, ProductFilter, Store};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub stock_quantity: u32,
    pub category: String,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<u32>,
    pub category: Option<String>,
    pub rating: Option<f32>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock_quantity: u32,
    pub category: String,
    pub rating: f32,
    pub in_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            price_cents: p.price.cents(),
            stock_quantity: p.stock_quantity,
            category: p.category.clone(),
            rating: p.rating,
            in_stock: p.in_stock(),
        }
    }
}

/// GET /products — list the catalog, with optional filters.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let mut filter = ProductFilter::all();
    filter.category = query.category;
    filter.search = query.search;
    filter.in_stock_only = query.in_stock;

    let products = state.store.list_products(filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — load one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.store.product(ProductId::from_uuid(id)).await?;
    Ok(Json(product.into()))
}

/// POST /products — create a catalog entry. Admin only.
#[tracing::instrument(skip(state, identity, req))]
pub async fn create<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let caller = identity.require()?;
    caller.require(Role::Admin)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("product name is required".to_string()));
    }
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }

    let product = Product::new(
        req.name,
        Money::from_cents(req.price_cents),
        req.stock_quantity,
        req.category,
    );
    state.store.insert_product(product.clone()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/:id — patch a catalog entry. Admin only.
#[tracing::instrument(skip(state, identity, req))]
pub async fn update<S: Store + Clone + 'static>(
    identity: Identity,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let caller = identity.require()?;
    caller.require(Role::Admin)?;

    if req.price_cents.is_some_and(|p| p < 0) {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }

    let patch = ProductPatch {
        name: req.name,
        price: req.price_cents.map(Money::from_cents),
        stock_quantity: req.stock_quantity,
        category: req.category,
        rating: req.rating,
    };
    let product = state
        .store
        .update_product(ProductId::from_uuid(id), patch)
        .await?;
    Ok(Json(product.into()))
}
