//! Domain layer for the storefront backend.
//!
//! This crate provides the entities and value objects shared by the cart,
//! checkout, and store layers:
//! - `Money` integer-cents currency type
//! - `Product` catalog entry with its non-negative stock invariant
//! - `Order` / `OrderItem` records and the `OrderStatus` state machine
//! - `Address` shipping address with its single-default invariant

pub mod address;
pub mod money;
pub mod order;
pub mod product;
pub mod status;

pub use address::{Address, AddressError};
pub use money::Money;
pub use order::{items_total, Order, OrderError, OrderItem, OrderPatch};
pub use product::{Product, ProductPatch};
pub use status::OrderStatus;
