//! The order placement orchestrator.

use cart::Cart;
use common::{AddressId, CurrentUser, OrderId, ProductId};
use domain::{Address, Order, OrderItem};
use store::{
    AddressStore, NotificationSink, OrderStore, Severity, StockLedger, Store, StoreError,
};

use crate::error::CheckoutError;

/// One recorded undo action, run in reverse completion order when a later
/// placement step fails.
#[derive(Debug)]
enum Undo {
    DeleteOrder { order_id: OrderId },
    RestoreStock { product_id: ProductId, quantity: u32 },
}

/// Converts a reconciled cart plus a resolved address into a persisted
/// order, its line items, and the matching stock decrements.
///
/// The three writes go through separate store calls, so a failure partway
/// leaves orphaned records unless undone. Each completed step pushes an
/// undo action; on failure the recorded actions run in reverse, returning
/// the catalog and order tables to their pre-checkout state.
#[derive(Clone)]
pub struct Checkout<S, N> {
    store: S,
    sink: N,
}

impl<S, N> Checkout<S, N>
where
    S: Store,
    N: NotificationSink,
{
    /// Creates a new checkout orchestrator.
    pub fn new(store: S, sink: N) -> Self {
        Self { store, sink }
    }

    /// Places an order from the caller's cart.
    ///
    /// Preconditions are checked in order, first failure short-circuits:
    /// the caller must be signed in, an address must resolve (the given one
    /// or the caller's default), and the cart must be non-empty.
    ///
    /// On success the cart is cleared and the pending order is returned.
    /// On failure the cart is left intact so the user can retry.
    #[tracing::instrument(skip(self, actor, cart), fields(user_id = ?actor.map(|a| a.id)))]
    pub async fn place_order(
        &self,
        actor: Option<&CurrentUser>,
        cart: &mut Cart,
        address_id: Option<AddressId>,
    ) -> Result<Order, CheckoutError> {
        let start = std::time::Instant::now();
        let result = self.try_place(actor, cart, address_id).await;
        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                metrics::histogram!("checkout_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                self.sink.notify(
                    Severity::Success,
                    &format!("Order placed! Total {}", order.total),
                );
            }
            Err(e) => {
                metrics::counter!("checkout_failed_total").increment(1);
                self.sink.notify(Severity::Error, &e.to_string());
            }
        }
        result
    }

    async fn try_place(
        &self,
        actor: Option<&CurrentUser>,
        cart: &mut Cart,
        address_id: Option<AddressId>,
    ) -> Result<Order, CheckoutError> {
        let user = actor.ok_or(CheckoutError::Unauthenticated)?;
        let address = self.resolve_address(user, address_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut undo: Vec<Undo> = Vec::new();

        // Step 1: order header.
        let order = Order::pending(user.id, cart.total(), address.id);
        self.store.insert_order(order.clone()).await?;
        undo.push(Undo::DeleteOrder { order_id: order.id });

        // Step 2: line items, snapshotting price and quantity from the cart.
        let items: Vec<OrderItem> = cart
            .items()
            .iter()
            .map(|entry| OrderItem::new(order.id, entry.product_id, entry.quantity, entry.price))
            .collect();
        if let Err(source) = self.store.insert_order_items(items).await {
            self.compensate(undo).await;
            return Err(CheckoutError::OrderItemsPersistFailure { source });
        }

        // Step 3: stock decrements, one per entry.
        for entry in cart.items() {
            match self
                .store
                .decrement_stock(entry.product_id, entry.quantity)
                .await
            {
                Ok(_) => undo.push(Undo::RestoreStock {
                    product_id: entry.product_id,
                    quantity: entry.quantity,
                }),
                Err(StoreError::InsufficientStock {
                    product_id,
                    requested,
                    available,
                }) => {
                    self.compensate(undo).await;
                    return Err(CheckoutError::InsufficientStock {
                        product_id,
                        requested,
                        available,
                    });
                }
                Err(e) => {
                    self.compensate(undo).await;
                    return Err(CheckoutError::Store(e));
                }
            }
        }

        cart.clear();
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");
        Ok(order)
    }

    async fn resolve_address(
        &self,
        user: &CurrentUser,
        address_id: Option<AddressId>,
    ) -> Result<Address, CheckoutError> {
        let address = match address_id {
            Some(id) => match self.store.address(id).await {
                Ok(address) => Some(address),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e.into()),
            },
            None => self.store.default_address(user.id).await?,
        };
        // An address belonging to someone else does not resolve.
        match address {
            Some(a) if a.user_id == user.id => Ok(a),
            _ => Err(CheckoutError::NoAddress),
        }
    }

    /// Runs recorded undo actions in reverse completion order. Undo
    /// failures are logged and the chain continues; nothing here may mask
    /// the original placement error.
    async fn compensate(&self, undo: Vec<Undo>) {
        for action in undo.into_iter().rev() {
            let result = match &action {
                Undo::RestoreStock {
                    product_id,
                    quantity,
                } => self
                    .store
                    .restore_stock(*product_id, *quantity)
                    .await
                    .map(|_| ()),
                Undo::DeleteOrder { order_id } => self.store.delete_order(*order_id).await,
            };
            match result {
                Ok(()) => tracing::info!(?action, "checkout step compensated"),
                Err(e) => tracing::error!(?action, error = %e, "checkout compensation failed"),
            }
        }
    }
}
