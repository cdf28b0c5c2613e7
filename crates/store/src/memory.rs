//! In-memory store implementation for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{AddressId, OrderId, OrderItemId, ProductId, UserId};
use domain::{Address, Order, OrderItem, OrderPatch, Product, ProductPatch};

use crate::addresses::AddressStore;
use crate::catalog::{CatalogStore, ProductFilter, StockLedger};
use crate::error::StoreError;
use crate::orders::OrderStore;
use crate::Result;

#[derive(Default)]
struct Inner {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    order_items: HashMap<OrderId, Vec<OrderItem>>,
    addresses: HashMap<AddressId, Address>,
}

#[derive(Default)]
struct Failures {
    fail_insert_items: bool,
    /// `Some(n)` allows n more successful restores, then fails the rest.
    restore_budget: Option<u32>,
}

/// In-memory backend implementing every store contract.
///
/// Mirrors the PostgreSQL backend's observable behavior, including the
/// conditional stock decrement. Failure injection toggles let tests drive
/// the orchestrators through their compensation paths, in the style of the
/// external-service doubles this layer replaces.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
    failures: Arc<Mutex<Failures>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product directly, bypassing the catalog contract.
    pub async fn seed_product(&self, product: Product) {
        self.inner
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Inserts an address directly.
    pub async fn seed_address(&self, address: Address) {
        self.inner
            .write()
            .await
            .addresses
            .insert(address.id, address);
    }

    /// Makes the next `insert_order_items` calls fail.
    pub fn set_fail_on_insert_items(&self, fail: bool) {
        self.failures.lock().unwrap().fail_insert_items = fail;
    }

    /// Allows `successes` more `restore_stock` calls to succeed, then fails
    /// every subsequent one until [`allow_restores`] is called.
    ///
    /// [`allow_restores`]: InMemoryStore::allow_restores
    pub fn fail_restores_after(&self, successes: u32) {
        self.failures.lock().unwrap().restore_budget = Some(successes);
    }

    /// Clears any injected restore failure.
    pub fn allow_restores(&self) {
        self.failures.lock().unwrap().restore_budget = None;
    }
}

#[async_trait]
impl StockLedger for InMemoryStore {
    async fn stock(&self, product_id: ProductId) -> Result<u32> {
        let inner = self.inner.read().await;
        inner
            .products
            .get(&product_id)
            .map(|p| p.stock_quantity)
            .ok_or_else(|| StoreError::not_found("product", product_id))
    }

    async fn decrement_stock(&self, product_id: ProductId, qty: u32) -> Result<u32> {
        // The single write lock makes the check-and-subtract atomic, the
        // same guarantee the SQL backend gets from its conditional UPDATE.
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::not_found("product", product_id))?;

        if qty > product.stock_quantity {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: qty,
                available: product.stock_quantity,
            });
        }
        product.stock_quantity -= qty;
        Ok(product.stock_quantity)
    }

    async fn restore_stock(&self, product_id: ProductId, qty: u32) -> Result<u32> {
        {
            let mut failures = self.failures.lock().unwrap();
            match failures.restore_budget {
                Some(0) => {
                    return Err(StoreError::Conflict("injected restore failure".to_string()));
                }
                Some(n) => failures.restore_budget = Some(n - 1),
                None => {}
            }
        }

        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::not_found("product", product_id))?;
        product.stock_quantity += qty;
        Ok(product.stock_quantity)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn product(&self, id: ProductId) -> Result<Product> {
        let inner = self.inner.read().await;
        inner
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        self.inner
            .write()
            .await
            .products
            .insert(product.id, product);
        Ok(())
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        product.apply(patch);
        Ok(product.clone())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        self.inner.write().await.orders.insert(order.id, order);
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Order> {
        let inner = self.inner.read().await;
        inner
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(restored) = patch.stock_restored {
            order.stock_restored = restored;
        }
        Ok(order.clone())
    }

    async fn insert_order_items(&self, items: Vec<OrderItem>) -> Result<()> {
        if self.failures.lock().unwrap().fail_insert_items {
            return Err(StoreError::Conflict(
                "injected order item insert failure".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        for item in &items {
            if !inner.orders.contains_key(&item.order_id) {
                return Err(StoreError::not_found("order", item.order_id));
            }
        }
        for item in items {
            inner.order_items.entry(item.order_id).or_default().push(item);
        }
        Ok(())
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let inner = self.inner.read().await;
        Ok(inner.order_items.get(&order_id).cloned().unwrap_or_default())
    }

    async fn mark_item_restored(&self, item_id: OrderItemId) -> Result<()> {
        let mut inner = self.inner.write().await;
        for items in inner.order_items.values_mut() {
            if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
                item.stock_restored = true;
                return Ok(());
            }
        }
        Err(StoreError::not_found("order item", item_id))
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .orders
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        inner.order_items.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AddressStore for InMemoryStore {
    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>> {
        let inner = self.inner.read().await;
        let mut addresses: Vec<Address> = inner
            .addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(addresses)
    }

    async fn address(&self, id: AddressId) -> Result<Address> {
        let inner = self.inner.read().await;
        inner
            .addresses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("address", id))
    }

    async fn default_address(&self, user_id: UserId) -> Result<Option<Address>> {
        let inner = self.inner.read().await;
        Ok(inner
            .addresses
            .values()
            .find(|a| a.user_id == user_id && a.is_default)
            .cloned())
    }

    async fn upsert_address(&self, address: Address) -> Result<Address> {
        let mut inner = self.inner.write().await;
        if address.is_default {
            for other in inner.addresses.values_mut() {
                if other.user_id == address.user_id && other.id != address.id {
                    other.is_default = false;
                }
            }
        }
        inner.addresses.insert(address.id, address.clone());
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::Money;

    fn widget(stock: u32) -> Product {
        Product::new("Widget", Money::from_cents(1000), stock, "tools")
    }

    fn address_for(user_id: UserId, is_default: bool) -> Address {
        Address {
            id: AddressId::new(),
            user_id,
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            pincode: "560001".to_string(),
            address_line: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            is_default,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn decrement_reduces_stock() {
        let store = InMemoryStore::new();
        let product = widget(5);
        let id = product.id;
        store.seed_product(product).await;

        assert_eq!(store.decrement_stock(id, 2).await.unwrap(), 3);
        assert_eq!(store.stock(id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn oversized_decrement_fails_and_leaves_stock_unchanged() {
        let store = InMemoryStore::new();
        let product = widget(3);
        let id = product.id;
        store.seed_product(product).await;

        let err = store.decrement_stock(id, 4).await.unwrap_err();
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other}"),
        }
        assert_eq!(store.stock(id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn stock_never_goes_negative_under_contention() {
        let store = InMemoryStore::new();
        let product = widget(1);
        let id = product.id;
        store.seed_product(product).await;

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.decrement_stock(id, 1).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.decrement_stock(id, 1).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(store.stock(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn restore_credits_stock_back() {
        let store = InMemoryStore::new();
        let product = widget(1);
        let id = product.id;
        store.seed_product(product).await;

        assert_eq!(store.restore_stock(id, 4).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let store = InMemoryStore::new();
        let id = ProductId::new();
        assert!(store.stock(id).await.unwrap_err().is_not_found());
        assert!(store.decrement_stock(id, 1).await.unwrap_err().is_not_found());
        assert!(store.restore_stock(id, 1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn injected_restore_failure_respects_budget() {
        let store = InMemoryStore::new();
        let product = widget(0);
        let id = product.id;
        store.seed_product(product).await;

        store.fail_restores_after(1);
        assert!(store.restore_stock(id, 1).await.is_ok());
        assert!(store.restore_stock(id, 1).await.is_err());

        store.allow_restores();
        assert!(store.restore_stock(id, 1).await.is_ok());
    }

    #[tokio::test]
    async fn list_products_applies_filter() {
        let store = InMemoryStore::new();
        store.seed_product(widget(3)).await;
        store
            .seed_product(Product::new("Gadget", Money::from_cents(500), 0, "toys"))
            .await;

        let all = store.list_products(ProductFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let in_stock = store
            .list_products(ProductFilter::all().in_stock())
            .await
            .unwrap();
        assert_eq!(in_stock.len(), 1);
        assert_eq!(in_stock[0].name, "Widget");
    }

    #[tokio::test]
    async fn update_product_applies_patch() {
        let store = InMemoryStore::new();
        let product = widget(3);
        let id = product.id;
        store.seed_product(product).await;

        let updated = store
            .update_product(
                id,
                ProductPatch {
                    stock_quantity: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock_quantity, 10);
    }

    #[tokio::test]
    async fn order_items_require_an_existing_header() {
        let store = InMemoryStore::new();
        let item = OrderItem::new(OrderId::new(), ProductId::new(), 1, Money::from_cents(100));
        assert!(store
            .insert_order_items(vec![item])
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn delete_order_cascades_to_items() {
        let store = InMemoryStore::new();
        let order = Order::pending(UserId::new(), Money::from_cents(100), AddressId::new());
        let order_id = order.id;
        store.insert_order(order).await.unwrap();
        store
            .insert_order_items(vec![OrderItem::new(
                order_id,
                ProductId::new(),
                1,
                Money::from_cents(100),
            )])
            .await
            .unwrap();

        store.delete_order(order_id).await.unwrap();
        assert!(store.order(order_id).await.unwrap_err().is_not_found());
        assert!(store.order_items(order_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_item_restored_sets_the_flag() {
        let store = InMemoryStore::new();
        let order = Order::pending(UserId::new(), Money::from_cents(100), AddressId::new());
        let order_id = order.id;
        store.insert_order(order).await.unwrap();
        let item = OrderItem::new(order_id, ProductId::new(), 1, Money::from_cents(100));
        let item_id = item.id;
        store.insert_order_items(vec![item]).await.unwrap();

        store.mark_item_restored(item_id).await.unwrap();
        let items = store.order_items(order_id).await.unwrap();
        assert!(items[0].stock_restored);
    }

    #[tokio::test]
    async fn new_default_address_clears_the_old_one() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let first = address_for(user_id, true);
        let first_id = first.id;
        store.upsert_address(first).await.unwrap();

        let second = address_for(user_id, true);
        let second_id = second.id;
        store.upsert_address(second).await.unwrap();

        let addresses = store.addresses_for_user(user_id).await.unwrap();
        let defaults: Vec<_> = addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second_id);
        assert!(!store.address(first_id).await.unwrap().is_default);

        let default = store.default_address(user_id).await.unwrap().unwrap();
        assert_eq!(default.id, second_id);
    }

    #[tokio::test]
    async fn non_default_upsert_keeps_existing_default() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let first = address_for(user_id, true);
        let first_id = first.id;
        store.upsert_address(first).await.unwrap();
        store.upsert_address(address_for(user_id, false)).await.unwrap();

        let default = store.default_address(user_id).await.unwrap().unwrap();
        assert_eq!(default.id, first_id);
    }
}
