//! Order header and line item records.

use chrono::{DateTime, Utc};
use common::{AddressId, OrderId, OrderItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;
use crate::status::OrderStatus;

/// Errors raised by order-level invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested status change is not a valid transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order is in a terminal status and cannot change again.
    #[error("order is already {status}")]
    Terminal { status: OrderStatus },
}

/// The top-level order record, distinct from its line items.
///
/// Created once by checkout together with its items; afterwards only the
/// status and the restoration flag ever change, and only through the
/// lifecycle service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Always equals the sum of `price × quantity` over the order's items.
    pub total: Money,
    pub status: OrderStatus,
    /// Set once the order's stock has been credited back after cancellation.
    pub stock_restored: bool,
    pub address_id: Option<AddressId>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order header.
    pub fn pending(user_id: UserId, total: Money, address_id: AddressId) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            total,
            status: OrderStatus::Pending,
            stock_restored: false,
            address_id: Some(address_id),
            created_at: Utc::now(),
        }
    }

    /// Validates a status change for the intended linear-plus-cancel model.
    pub fn check_transition(&self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::Terminal {
                status: self.status,
            });
        }
        if !self.status.can_transition(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    /// Validates a forced status change by an admin.
    pub fn check_admin_override(&self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::Terminal {
                status: self.status,
            });
        }
        if !self.status.admin_can_override(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

/// One product-quantity-price entry belonging to an order.
///
/// `price` is a snapshot taken from the cart at order time; later product
/// price changes never affect it. Immutable after creation except for the
/// per-item restoration flag maintained by cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    /// Set once this item's quantity has been credited back to stock.
    /// Together with the order-level flag this makes restoration
    /// at-most-once even when a restore loop fails partway.
    pub stock_restored: bool,
}

impl OrderItem {
    /// Creates a line item for an order.
    pub fn new(order_id: OrderId, product_id: ProductId, quantity: u32, price: Money) -> Self {
        Self {
            id: OrderItemId::new(),
            order_id,
            product_id,
            quantity,
            price,
            stock_restored: false,
        }
    }

    /// Returns the line total (`price × quantity`).
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Sums line totals; the order header's `total` must equal this exactly.
pub fn items_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

/// Partial update applied through the order store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub stock_restored: Option<bool>,
}

impl OrderPatch {
    /// Patch that only changes the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            stock_restored: None,
        }
    }

    /// Patch that only sets the restoration flag.
    pub fn restored() -> Self {
        Self {
            status: None,
            stock_restored: Some(true),
        }
    }
}
