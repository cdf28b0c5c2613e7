//! Order header and line item persistence contract.

use async_trait::async_trait;
use common::{OrderId, OrderItemId, UserId};
use domain::{Order, OrderItem, OrderPatch};

use crate::Result;

/// Persistence for order headers and their line items.
///
/// Headers and items are inserted through separate calls; the checkout
/// orchestrator owns the compensation when a later step fails.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order header.
    async fn insert_order(&self, order: Order) -> Result<()>;

    /// Loads one order header.
    async fn order(&self, id: OrderId) -> Result<Order>;

    /// Applies a patch (status and/or restoration flag) and returns the
    /// updated header.
    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order>;

    /// Inserts the line items for an order. All items must reference an
    /// existing order; the insert is atomic.
    async fn insert_order_items(&self, items: Vec<OrderItem>) -> Result<()>;

    /// Lists the line items belonging to an order.
    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Marks a single line item's stock as credited back. Part of the
    /// per-item restoration ledger that keeps cancellation retries from
    /// double-crediting.
    async fn mark_item_restored(&self, item_id: OrderItemId) -> Result<()>;

    /// Lists a user's orders, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists every order, newest first (admin console).
    async fn all_orders(&self) -> Result<Vec<Order>>;

    /// Hard-deletes an order and its items (admin only; cascades).
    async fn delete_order(&self, id: OrderId) -> Result<()>;
}
