//! Order placement and lifecycle for the storefront backend.
//!
//! Two services live here:
//! - [`Checkout`] turns a reconciled cart plus a resolved address into an
//!   order header, line items, and stock decrements, with an explicit undo
//!   list compensating partial failures in reverse order.
//! - [`OrderLifecycle`] enforces the linear-plus-cancel status machine and
//!   runs the at-most-once stock restoration on cancellation.

pub mod error;
pub mod lifecycle;
pub mod placement;

pub use error::{CheckoutError, LifecycleError};
pub use lifecycle::OrderLifecycle;
pub use placement::Checkout;
