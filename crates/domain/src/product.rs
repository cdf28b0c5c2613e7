//! Catalog product entity.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A sellable catalog entry.
///
/// `stock_quantity` is the single source of truth for sellable inventory.
/// Invariant: it never goes negative — a decrement that would underflow is
/// rejected at the store layer and leaves the value unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock_quantity: u32,
    pub category: String,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a fresh ID.
    pub fn new(
        name: impl Into<String>,
        price: Money,
        stock_quantity: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            stock_quantity,
            category: category.into(),
            rating: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Returns true if at least one unit is sellable.
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Applies an admin patch in place.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock_quantity {
            self.stock_quantity = stock;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// Partial update applied by admin product CRUD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock_quantity: Option<u32>,
    pub category: Option<String>,
    pub rating: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_starts_unrated() {
        let p = Product::new("Widget", Money::from_cents(1000), 3, "tools");
        assert_eq!(p.rating, 0.0);
        assert!(p.in_stock());
    }

    #[test]
    fn zero_stock_is_not_in_stock() {
        let p = Product::new("Widget", Money::from_cents(1000), 0, "tools");
        assert!(!p.in_stock());
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut p = Product::new("Widget", Money::from_cents(1000), 3, "tools");
        p.apply(ProductPatch {
            price: Some(Money::from_cents(1200)),
            stock_quantity: Some(7),
            ..Default::default()
        });
        assert_eq!(p.name, "Widget");
        assert_eq!(p.price, Money::from_cents(1200));
        assert_eq!(p.stock_quantity, 7);
        assert_eq!(p.category, "tools");
    }
}
