//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::{CheckoutError, LifecycleError};
use domain::OrderError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// No caller identity was supplied.
    Unauthenticated,
    /// The caller lacks the capability for this operation.
    Forbidden(String),
    /// Cart reconciliation error.
    Cart(CartError),
    /// Order placement error.
    Checkout(CheckoutError),
    /// Order lifecycle error.
    Lifecycle(LifecycleError),
    /// Store-level failure outside the services above.
    Store(StoreError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "not signed in".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Lifecycle(err) => lifecycle_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::OutOfStock | CartError::StockExceeded { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CartError::Store(e) if e.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
        CartError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
        CheckoutError::NoAddress | CheckoutError::EmptyCart => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        CheckoutError::OrderItemsPersistFailure { .. } | CheckoutError::Store(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn lifecycle_error_to_response(err: LifecycleError) -> (StatusCode, String) {
    match &err {
        LifecycleError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        LifecycleError::Order(OrderError::InvalidTransition { .. })
        | LifecycleError::Order(OrderError::Terminal { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        LifecycleError::Store(e) => store_error_to_response_ref(e, err.to_string()),
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    let message = err.to_string();
    store_error_to_response_ref(&err, message)
}

fn store_error_to_response_ref(err: &StoreError, message: String) -> (StatusCode, String) {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, message),
        StoreError::InsufficientStock { .. } | StoreError::Conflict(_) => {
            (StatusCode::CONFLICT, message)
        }
        StoreError::Database(_) | StoreError::Migration(_) => {
            tracing::error!(error = %message, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        ApiError::Lifecycle(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<common::Forbidden> for ApiError {
    fn from(err: common::Forbidden) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}
