//! Saved shipping address persistence contract.

use async_trait::async_trait;
use common::{AddressId, UserId};
use domain::Address;

use crate::Result;

/// Persistence for saved shipping addresses.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Lists a user's addresses, default first, then newest first.
    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>>;

    /// Loads one address.
    async fn address(&self, id: AddressId) -> Result<Address>;

    /// Returns the user's default address, if any.
    async fn default_address(&self, user_id: UserId) -> Result<Option<Address>>;

    /// Inserts or replaces an address. When `is_default` is set, any prior
    /// default for the same user is cleared in the same transaction, so at
    /// most one default exists per user at all times.
    async fn upsert_address(&self, address: Address) -> Result<Address>;
}
