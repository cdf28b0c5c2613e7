//! Shared types for the storefront backend.
//!
//! Provides the typed identifiers used across every crate and the caller
//! identity (`CurrentUser`) with its capability check.

pub mod identity;
pub mod types;

pub use identity::{CurrentUser, Forbidden, Role};
pub use types::{AddressId, OrderId, OrderItemId, ProductId, UserId};
