//! Catalog and stock ledger contracts.

use async_trait::async_trait;
use common::ProductId;
use domain::{Product, ProductPatch};

use crate::Result;

/// Filter for catalog listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category: Option<String>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// Only return products with at least one unit in stock.
    pub in_stock_only: bool,
}

impl ProductFilter {
    /// Filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the filter to one category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Adds a name search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Excludes sold-out products.
    pub fn in_stock(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    /// Returns true if the product passes this filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref category) = self.category
            && &product.category != category
        {
            return false;
        }
        if let Some(ref term) = self.search
            && !product.name.to_lowercase().contains(&term.to_lowercase())
        {
            return false;
        }
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        true
    }
}

/// The single source of truth for sellable inventory.
///
/// `decrement_stock` is the real guard against overselling: the cart's
/// pre-checks are advisory UX only. Each call must be atomic with respect
/// to concurrent decrements on the same product.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Returns the available quantity for a product.
    async fn stock(&self, product_id: ProductId) -> Result<u32>;

    /// Atomically reduces stock by `qty`, failing with `InsufficientStock`
    /// if fewer than `qty` units are available. Returns the remaining
    /// quantity. A rejected decrement leaves stock unchanged.
    async fn decrement_stock(&self, product_id: ProductId, qty: u32) -> Result<u32>;

    /// Atomically increases stock by `qty` and returns the new quantity.
    /// Idempotency is the caller's responsibility.
    async fn restore_stock(&self, product_id: ProductId, qty: u32) -> Result<u32>;
}

/// Product catalog reads and admin CRUD.
#[async_trait]
pub trait CatalogStore: StockLedger {
    /// Loads one product.
    async fn product(&self, id: ProductId) -> Result<Product>;

    /// Lists products matching the filter, newest first.
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>>;

    /// Inserts a new catalog entry.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Applies an admin patch and returns the updated product.
    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn product(name: &str, category: &str, stock: u32) -> Product {
        Product::new(name, Money::from_cents(1000), stock, category)
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ProductFilter::all().matches(&product("Widget", "tools", 0)));
    }

    #[test]
    fn category_filter_is_exact() {
        let filter = ProductFilter::all().category("tools");
        assert!(filter.matches(&product("Widget", "tools", 1)));
        assert!(!filter.matches(&product("Widget", "toys", 1)));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = ProductFilter::all().search("WID");
        assert!(filter.matches(&product("Super Widget", "tools", 1)));
        assert!(!filter.matches(&product("Gadget", "tools", 1)));
    }

    #[test]
    fn in_stock_filter_excludes_sold_out() {
        let filter = ProductFilter::all().in_stock();
        assert!(filter.matches(&product("Widget", "tools", 1)));
        assert!(!filter.matches(&product("Widget", "tools", 0)));
    }
}
