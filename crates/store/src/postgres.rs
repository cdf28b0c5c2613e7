//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use common::{AddressId, OrderId, OrderItemId, ProductId, UserId};
use domain::{Address, Money, Order, OrderItem, OrderPatch, OrderStatus, Product, ProductPatch};

use crate::addresses::AddressStore;
use crate::catalog::{CatalogStore, ProductFilter, StockLedger};
use crate::error::StoreError;
use crate::orders::OrderStore;
use crate::Result;

/// PostgreSQL store covering the catalog, orders, and addresses.
///
/// Stock decrements go through a single conditional `UPDATE`, so the
/// never-negative invariant holds under concurrent checkouts without any
/// application-side locking.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price")?),
            stock_quantity: quantity_from_db(row.try_get("stock_quantity")?),
            category: row.try_get("category")?,
            rating: row.try_get("rating")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            total: Money::from_cents(row.try_get("total")?),
            status,
            stock_restored: row.try_get("stock_restored")?,
            address_id: row
                .try_get::<Option<Uuid>, _>("address_id")?
                .map(AddressId::from_uuid),
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_item(row: PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: quantity_from_db(row.try_get("quantity")?),
            price: Money::from_cents(row.try_get("price")?),
            stock_restored: row.try_get("stock_restored")?,
        })
    }

    fn row_to_address(row: PgRow) -> Result<Address> {
        Ok(Address {
            id: AddressId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            pincode: row.try_get("pincode")?,
            address_line: row.try_get("address_line")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            is_default: row.try_get("is_default")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Quantities are stored as BIGINT with a non-negative CHECK constraint, so
/// the conversion back to `u32` cannot underflow in practice.
fn quantity_from_db(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[async_trait]
impl StockLedger for PostgresStore {
    async fn stock(&self, product_id: ProductId) -> Result<u32> {
        let quantity: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(product_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        quantity
            .map(quantity_from_db)
            .ok_or_else(|| StoreError::not_found("product", product_id))
    }

    #[tracing::instrument(skip(self))]
    async fn decrement_stock(&self, product_id: ProductId, qty: u32) -> Result<u32> {
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2
            WHERE id = $1 AND stock_quantity >= $2
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(i64::from(qty))
        .fetch_optional(&self.pool)
        .await?;

        match remaining {
            Some(remaining) => Ok(quantity_from_db(remaining)),
            // No row matched: either the product is gone or the stock is
            // short. A follow-up read tells the two apart; the reported
            // `available` can lag the rejection if stock moved in between,
            // which only affects the error message, not control flow.
            None => {
                let available = self.stock(product_id).await?;
                Err(StoreError::InsufficientStock {
                    product_id,
                    requested: qty,
                    available,
                })
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn restore_stock(&self, product_id: ProductId, qty: u32) -> Result<u32> {
        let quantity: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2
            WHERE id = $1
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(i64::from(qty))
        .fetch_optional(&self.pool)
        .await?;
        quantity
            .map(quantity_from_db)
            .ok_or_else(|| StoreError::not_found("product", product_id))
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn product(&self, id: ProductId) -> Result<Product> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("product", id))?;
        Self::row_to_product(row)
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND (NOT $3 OR stock_quantity > 0)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.category)
        .bind(filter.search)
        .bind(filter.in_stock_only)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, stock_quantity, category, rating, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(i64::from(product.stock_quantity))
        .bind(&product.category)
        .bind(product.rating)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                stock_quantity = COALESCE($4, stock_quantity),
                category = COALESCE($5, category),
                rating = COALESCE($6, rating)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.price.map(|p| p.cents()))
        .bind(patch.stock_quantity.map(i64::from))
        .bind(patch.category)
        .bind(patch.rating)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("product", id))?;
        Self::row_to_product(row)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total, status, stock_restored, address_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total.cents())
        .bind(order.status.as_str())
        .bind(order.stock_restored)
        .bind(order.address_id.map(|a| a.as_uuid()))
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("order", id))?;
        Self::row_to_order(row)
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = COALESCE($2, status),
                stock_restored = COALESCE($3, stock_restored)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.status.map(|s| s.as_str().to_string()))
        .bind(patch.stock_restored)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))?;
        Self::row_to_order(row)
    }

    async fn insert_order_items(&self, items: Vec<OrderItem>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price, stock_restored)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(i64::from(item.quantity))
            .bind(item.price.cents())
            .bind(item.stock_restored)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return StoreError::not_found("order", item.order_id);
                }
                StoreError::Database(e)
            })?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
            .bind(order_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn mark_item_restored(&self, item_id: OrderItemId) -> Result<()> {
        let result = sqlx::query("UPDATE order_items SET stock_restored = TRUE WHERE id = $1")
            .bind(item_id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order item", item_id));
        }
        Ok(())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        // order_items go with the header via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }
}

#[async_trait]
impl AddressStore for PostgresStore {
    async fn addresses_for_user(&self, user_id: UserId) -> Result<Vec<Address>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_address).collect()
    }

    async fn address(&self, id: AddressId) -> Result<Address> {
        let row = sqlx::query("SELECT * FROM addresses WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("address", id))?;
        Self::row_to_address(row)
    }

    async fn default_address(&self, user_id: UserId) -> Result<Option<Address>> {
        let row = sqlx::query("SELECT * FROM addresses WHERE user_id = $1 AND is_default")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_address).transpose()
    }

    async fn upsert_address(&self, address: Address) -> Result<Address> {
        let mut tx = self.pool.begin().await?;

        if address.is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND id <> $2",
            )
            .bind(address.user_id.as_uuid())
            .bind(address.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(
            r#"
            INSERT INTO addresses
                (id, user_id, full_name, phone, pincode, address_line, city, state, is_default, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                pincode = EXCLUDED.pincode,
                address_line = EXCLUDED.address_line,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                is_default = EXCLUDED.is_default
            RETURNING *
            "#,
        )
        .bind(address.id.as_uuid())
        .bind(address.user_id.as_uuid())
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(&address.pincode)
        .bind(&address.address_line)
        .bind(&address.city)
        .bind(&address.state)
        .bind(address.is_default)
        .bind(address.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_address(row)
    }
}
