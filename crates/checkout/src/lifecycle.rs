//! The order state machine and its side effects.

use common::{CurrentUser, Forbidden, OrderId, Role};
use domain::{Order, OrderPatch, OrderStatus};
use store::{NotificationSink, OrderStore, Severity, StockLedger, Store};

use crate::error::LifecycleError;

/// Governs status transitions and the one-time stock restoration on
/// cancellation.
///
/// Restoration is guarded twice: a per-item flag makes each line item's
/// credit at-most-once even when a restore loop dies partway (cancel again
/// to resume), and the order-level flag short-circuits the whole pass once
/// every item is done.
#[derive(Clone)]
pub struct OrderLifecycle<S, N> {
    store: S,
    sink: N,
}

impl<S, N> OrderLifecycle<S, N>
where
    S: Store,
    N: NotificationSink,
{
    /// Creates a new lifecycle service.
    pub fn new(store: S, sink: N) -> Self {
        Self { store, sink }
    }

    /// Loads one order; callers see only their own unless they are admins.
    pub async fn order(&self, actor: &CurrentUser, id: OrderId) -> Result<Order, LifecycleError> {
        let order = self.store.order(id).await?;
        self.authorize_owner(actor, &order)?;
        Ok(order)
    }

    /// Lists the caller's own orders, newest first.
    pub async fn orders(&self, actor: &CurrentUser) -> Result<Vec<Order>, LifecycleError> {
        Ok(self.store.orders_for_user(actor.id).await?)
    }

    /// Lists every order for the admin console.
    pub async fn all_orders(&self, actor: &CurrentUser) -> Result<Vec<Order>, LifecycleError> {
        actor.require(Role::Admin)?;
        Ok(self.store.all_orders().await?)
    }

    /// Moves an order along the linear progression
    /// (pending → packed → shipped → delivered, cancel from any non-terminal
    /// state). Admin only; cancellation goes through [`cancel`] so the
    /// restoration side effect runs.
    ///
    /// [`cancel`]: OrderLifecycle::cancel
    #[tracing::instrument(skip(self, actor))]
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, LifecycleError> {
        actor.require(Role::Admin)?;
        if to == OrderStatus::Cancelled {
            return self.cancel(actor, id).await;
        }
        let order = self.store.order(id).await?;
        order.check_transition(to)?;
        let updated = self.store.update_order(id, OrderPatch::status(to)).await?;
        tracing::info!(order_id = %id, from = %order.status, %to, "order status updated");
        Ok(updated)
    }

    /// Forces a non-linear status change, the administrative escape hatch.
    ///
    /// Skips the linear progression check but still refuses to pull an
    /// order out of a terminal state, and still routes cancellation through
    /// the restoring path.
    #[tracing::instrument(skip(self, actor))]
    pub async fn force_status(
        &self,
        actor: &CurrentUser,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, LifecycleError> {
        actor.require(Role::Admin)?;
        if to == OrderStatus::Cancelled {
            return self.cancel(actor, id).await;
        }
        let order = self.store.order(id).await?;
        order.check_admin_override(to)?;
        let updated = self.store.update_order(id, OrderPatch::status(to)).await?;
        tracing::warn!(order_id = %id, from = %order.status, %to, "order status forced");
        Ok(updated)
    }

    /// Cancels an order and credits its stock back exactly once.
    ///
    /// Owners may cancel their own orders; admins may cancel any. Calling
    /// again on an already-cancelled order is not an error: it resumes a
    /// partially-failed restoration if one exists, and is a pure no-op
    /// otherwise.
    #[tracing::instrument(skip(self, actor))]
    pub async fn cancel(
        &self,
        actor: &CurrentUser,
        id: OrderId,
    ) -> Result<Order, LifecycleError> {
        let order = self.store.order(id).await?;
        self.authorize_owner(actor, &order)?;

        // Validate, then mutate, then side-effect.
        let order = if order.status == OrderStatus::Cancelled {
            order
        } else {
            order.check_transition(OrderStatus::Cancelled)?;
            let updated = self
                .store
                .update_order(id, OrderPatch::status(OrderStatus::Cancelled))
                .await?;
            metrics::counter!("orders_cancelled_total").increment(1);
            tracing::info!(order_id = %id, "order cancelled");
            updated
        };

        if order.stock_restored {
            return Ok(order);
        }
        let order = self.restore_items(order).await?;
        self.sink.notify(Severity::Info, "Order cancelled");
        Ok(order)
    }

    /// Credits back every not-yet-restored item, marking each as it lands.
    /// A failure partway leaves the finished items flagged, so a retry
    /// credits only the remainder.
    async fn restore_items(&self, order: Order) -> Result<Order, LifecycleError> {
        for item in self.store.order_items(order.id).await? {
            if item.stock_restored {
                continue;
            }
            self.store
                .restore_stock(item.product_id, item.quantity)
                .await?;
            self.store.mark_item_restored(item.id).await?;
            metrics::counter!("stock_restorations_total").increment(1);
        }
        let updated = self.store.update_order(order.id, OrderPatch::restored()).await?;
        tracing::info!(order_id = %order.id, "stock restored");
        Ok(updated)
    }

    /// Hard-deletes an order and its items. Admin only; cascades.
    ///
    /// Deletion does not restore stock. Cancel first if the order's
    /// decrements should be credited back.
    #[tracing::instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &CurrentUser, id: OrderId) -> Result<(), LifecycleError> {
        actor.require(Role::Admin)?;
        self.store.delete_order(id).await?;
        tracing::warn!(order_id = %id, "order deleted");
        Ok(())
    }

    fn authorize_owner(&self, actor: &CurrentUser, order: &Order) -> Result<(), Forbidden> {
        if actor.is_admin() || order.user_id == actor.id {
            Ok(())
        } else {
            Err(Forbidden {
                required: Role::Admin,
            })
        }
    }
}
