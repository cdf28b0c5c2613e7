//! The per-session cart and its stock-reconciled mutations.

use common::ProductId;
use domain::{Money, Product};
use serde::{Deserialize, Serialize};
use store::{NotificationSink, Severity, StockLedger};

use crate::error::{CartError, Result};

/// One candidate line item held in a cart.
///
/// `price` and `name` are snapshots taken when the item was added; later
/// catalog changes do not affect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl CartItem {
    /// Snapshots a product into a cart entry.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    /// Returns the line total (`price × quantity`).
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// An ordered, per-session collection of candidate line items.
///
/// Every `add` is reconciled against the stock ledger before it commits
/// locally, but this pre-check is advisory UX only: the ledger's atomic
/// decrement at checkout is the real guard against overselling. One cart
/// exists per user session; it is never shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entries in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns true if the cart holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Adds `quantity` units of a product, merging with an existing entry.
    ///
    /// Reconciles against live stock first: fails with [`CartError::OutOfStock`]
    /// when nothing is sellable, and with [`CartError::StockExceeded`] when the
    /// cart's quantity for this product would pass the available stock. A
    /// failed add leaves the cart unchanged.
    pub async fn add<L, N>(
        &mut self,
        ledger: &L,
        sink: &N,
        product: &Product,
        quantity: u32,
    ) -> Result<()>
    where
        L: StockLedger + ?Sized,
        N: NotificationSink + ?Sized,
    {
        let quantity = quantity.max(1);
        let stock = ledger.stock(product.id).await?;

        if stock == 0 {
            sink.notify(Severity::Error, &format!("{} is out of stock", product.name));
            return Err(CartError::OutOfStock);
        }

        let existing = self
            .items
            .iter()
            .find(|i| i.product_id == product.id)
            .map_or(0, |i| i.quantity);
        if existing + quantity > stock {
            sink.notify(Severity::Error, &format!("Only {stock} in stock"));
            return Err(CartError::StockExceeded { available: stock });
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
        sink.notify(Severity::Success, &format!("{} added to cart", product.name));
        Ok(())
    }

    /// Removes a product's entry; no-op if it is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Sets an entry's quantity, clamped to a minimum of 1.
    ///
    /// Deliberately does not re-check live stock; the staleness window is
    /// closed by the atomic decrement at checkout.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity.max(1);
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sums `price × quantity` over all entries. Pure, no I/O.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{InMemoryStore, RecordingSink};

    async fn seeded(stock: u32) -> (InMemoryStore, Product) {
        let store = InMemoryStore::new();
        let product = Product::new("Widget", Money::from_cents(1000), stock, "tools");
        store.seed_product(product.clone()).await;
        (store, product)
    }

    #[tokio::test]
    async fn add_within_stock_succeeds_and_notifies() {
        let (store, product) = seeded(3).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();

        cart.add(&store, &sink, &product, 2).await.unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(sink.messages()[0].0, Severity::Success);
    }

    #[tokio::test]
    async fn second_add_past_stock_fails_and_leaves_cart_unchanged() {
        // Stock 3: P×2 goes in, a second P×2 would make 4 and is rejected.
        let (store, product) = seeded(3).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();

        cart.add(&store, &sink, &product, 2).await.unwrap();
        let err = cart.add(&store, &sink, &product, 2).await.unwrap_err();
        match err {
            CartError::StockExceeded { available } => assert_eq!(available, 3),
            other => panic!("expected StockExceeded, got {other}"),
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn merges_succeed_up_to_the_stock_ceiling() {
        let (store, product) = seeded(5).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();

        cart.add(&store, &sink, &product, 2).await.unwrap();
        cart.add(&store, &sink, &product, 3).await.unwrap();
        assert_eq!(cart.items()[0].quantity, 5);

        assert!(cart.add(&store, &sink, &product, 1).await.is_err());
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[tokio::test]
    async fn sold_out_product_is_rejected_outright() {
        let (store, product) = seeded(0).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();

        let err = cart.add(&store, &sink, &product, 1).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock));
        assert!(cart.is_empty());
        assert_eq!(sink.messages()[0].0, Severity::Error);
    }

    #[tokio::test]
    async fn oversized_first_add_is_rejected() {
        let (store, product) = seeded(3).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();

        let err = cart.add(&store, &sink, &product, 4).await.unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { available: 3 }));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn add_snapshots_price_at_add_time() {
        let (store, product) = seeded(3).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();
        cart.add(&store, &sink, &product, 1).await.unwrap();

        // A later catalog price change does not touch the cart entry.
        let mut changed = product.clone();
        changed.price = Money::from_cents(9999);
        store.seed_product(changed).await;
        assert_eq!(cart.items()[0].price, Money::from_cents(1000));
    }

    #[tokio::test]
    async fn unknown_product_surfaces_the_store_error() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let mut cart = Cart::new();
        let product = Product::new("Ghost", Money::from_cents(100), 1, "tools");

        let err = cart.add(&store, &sink, &product, 1).await.unwrap_err();
        assert!(matches!(err, CartError::Store(e) if e.is_not_found()));
    }

    #[test]
    fn remove_is_a_noop_for_absent_products() {
        let mut cart = Cart::new();
        cart.remove(ProductId::new());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn update_quantity_clamps_to_one() {
        let (store, product) = seeded(3).await;
        let sink = RecordingSink::new();
        let mut cart = Cart::new();
        cart.add(&store, &sink, &product, 2).await.unwrap();

        cart.update_quantity(product.id, 0);
        assert_eq!(cart.items()[0].quantity, 1);

        cart.update_quantity(product.id, 3);
        assert_eq!(cart.items()[0].quantity, 3);

        // Absent product: no-op.
        cart.update_quantity(ProductId::new(), 5);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn total_sums_line_totals() {
        let store = InMemoryStore::new();
        let sink = RecordingSink::new();
        let a = Product::new("A", Money::from_cents(1000), 5, "tools");
        let b = Product::new("B", Money::from_cents(250), 5, "tools");
        store.seed_product(a.clone()).await;
        store.seed_product(b.clone()).await;

        let mut cart = Cart::new();
        assert!(cart.total().is_zero());
        cart.add(&store, &sink, &a, 2).await.unwrap();
        cart.add(&store, &sink, &b, 3).await.unwrap();
        assert_eq!(cart.total(), Money::from_cents(2750));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }
}
