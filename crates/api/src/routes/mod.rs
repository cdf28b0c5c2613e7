//! Route handlers and shared application state.

pub mod addresses;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use std::collections::HashMap;
use std::sync::Arc;

use ::cart::Cart;
use checkout::{Checkout, OrderLifecycle};
use common::UserId;
use store::{Store, TracingSink};
use tokio::sync::{Mutex, RwLock};

/// Shared application state accessible from all handlers.
///
/// Carts are per-session: one [`Cart`] per signed-in user, held in memory
/// and lost on restart, matching their ephemeral lifecycle. Each cart sits
/// behind its own lock; the registry lock is never held across store I/O,
/// so one session's slow checkout cannot stall another's cart traffic.
pub struct AppState<S: Store> {
    pub store: S,
    pub checkout: Checkout<S, TracingSink>,
    pub lifecycle: OrderLifecycle<S, TracingSink>,
    pub carts: RwLock<HashMap<UserId, Arc<Mutex<Cart>>>>,
}

impl<S: Store + Clone> AppState<S> {
    /// Builds the state and its services around one store backend.
    pub fn new(store: S) -> Self {
        Self {
            checkout: Checkout::new(store.clone(), TracingSink),
            lifecycle: OrderLifecycle::new(store.clone(), TracingSink),
            store,
            carts: RwLock::new(HashMap::new()),
        }
    }

    /// Handle to the caller's cart, created on first use. The registry is
    /// locked only long enough to clone the handle out.
    pub async fn cart_handle(&self, user: UserId) -> Arc<Mutex<Cart>> {
        let mut carts = self.carts.write().await;
        Arc::clone(carts.entry(user).or_default())
    }
}
