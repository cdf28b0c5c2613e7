use store::StoreError;
use thiserror::Error;

/// Errors raised while reconciling cart mutations against live stock.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product has no sellable units at all.
    #[error("out of stock")]
    OutOfStock,

    /// Adding the requested quantity would take the cart past the
    /// product's currently known stock.
    #[error("only {available} in stock")]
    StockExceeded { available: u32 },

    /// The stock lookup itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
