use common::{Forbidden, ProductId};
use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors raised while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No caller identity was supplied.
    #[error("not signed in")]
    Unauthenticated,

    /// No shipping address could be resolved for the caller.
    #[error("no shipping address selected")]
    NoAddress,

    /// The cart holds no entries.
    #[error("cart is empty")]
    EmptyCart,

    /// The line items could not be persisted after the order header was
    /// written. The dangling header has been compensated away.
    #[error("failed to persist order items: {source}")]
    OrderItemsPersistFailure {
        #[source]
        source: StoreError,
    },

    /// A stock decrement was rejected during placement. Already-applied
    /// decrements and the order records have been compensated away.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A store call failed outside the compensable steps.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by order lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The caller lacks the capability for this operation.
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    /// The requested status change violates the state machine.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// Returns true if this is a not-found store error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LifecycleError::Store(e) if e.is_not_found())
    }
}
