//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Intended transitions (linear-plus-cancel):
/// ```text
/// Pending ──► Packed ──► Shipped ──► Delivered
///    │           │          │
///    └───────────┴──────────┴──► Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Admins may additionally move
/// an order between any non-terminal statuses (or straight into a terminal
/// one) as an explicit override; nothing ever leaves a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting fulfilment.
    #[default]
    Pending,

    /// Items packed, awaiting dispatch.
    Packed,

    /// Handed to the carrier.
    Shipped,

    /// Delivered to the customer (terminal).
    Delivered,

    /// Cancelled before delivery (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if the order can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if `next` is a valid step in the intended
    /// linear-plus-cancel progression.
    pub fn can_transition(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Packed)
            | (OrderStatus::Packed, OrderStatus::Shipped)
            | (OrderStatus::Shipped, OrderStatus::Delivered) => true,
            (from, OrderStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Returns true if an admin override may force this transition.
    ///
    /// The override is deliberately wider than [`can_transition`]: any
    /// move is allowed as long as the current status is not terminal and
    /// the target differs. Terminal statuses are final for everyone.
    ///
    /// [`can_transition`]: OrderStatus::can_transition
    pub fn admin_can_override(&self, next: OrderStatus) -> bool {
        !self.is_terminal() && *self != next
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "packed" => Ok(OrderStatus::Packed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
