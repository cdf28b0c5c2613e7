//! External-collaborator layer for the storefront backend.
//!
//! All persistence lives behind these traits; the application owns no
//! database engine of its own. Two backends are provided:
//! - [`InMemoryStore`] for tests and local development
//! - [`PostgresStore`] backed by sqlx against the managed database
//!
//! The stock operations are the critical surface: `decrement_stock` must be
//! an atomic conditional update at the storage layer, never a
//! read-modify-write pair in application code.

pub mod addresses;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod notify;
pub mod orders;
pub mod postgres;

pub use addresses::AddressStore;
pub use catalog::{CatalogStore, ProductFilter, StockLedger};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use notify::{NotificationSink, RecordingSink, Severity, TracingSink};
pub use orders::OrderStore;
pub use postgres::PostgresStore;

/// Convenience marker for a backend that implements every store contract.
pub trait Store: CatalogStore + OrderStore + AddressStore {}

impl<T: CatalogStore + OrderStore + AddressStore> Store for T {}
