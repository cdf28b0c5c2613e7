//! Per-session shopping cart for the storefront backend.
//!
//! The cart is an in-memory collection of candidate line items, reconciled
//! against the stock ledger on every add. It is advisory: the final word on
//! stock belongs to the ledger's atomic decrement during checkout.

pub mod cart;
pub mod error;

pub use cart::{Cart, CartItem};
pub use error::{CartError, Result};
