//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Stock is mutated from two places: catalog administration (absolute
//! values via `update`) and the sale-commit engine (relative deltas via
//! `adjust_stock`). The delta form keeps commit decrements correct even
//! if an admin edit lands between reading and writing.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::{Product, ProductInput};

use crate::error::{StoreError, StoreResult};

/// Repository for product table operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category, unit, image, stock
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category, unit, image, stock
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its assigned id.
    pub async fn insert(&self, input: &ProductInput) -> StoreResult<Product> {
        debug!(name = %input.name, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents, category, unit, image, stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&input.name)
        .bind(input.price_cents)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(&input.image)
        .bind(input.stock)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            price_cents: input.price_cents,
            category: input.category.clone(),
            unit: input.unit.clone(),
            image: input.image.clone(),
            stock: input.stock,
        })
    }

    /// Updates an existing product.
    pub async fn update(&self, id: i64, input: &ProductInput) -> StoreResult<()> {
        debug!(id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                category = ?4,
                unit = ?5,
                image = ?6,
                stock = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.price_cents)
        .bind(&input.category)
        .bind(&input.unit)
        .bind(&input.image)
        .bind(input.stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts stock by a relative delta (negative for sales).
    ///
    /// The result may go below zero; stock is intended non-negative but
    /// deliberately not enforced.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> StoreResult<()> {
        debug!(id, delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products SET stock = stock + ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Historical sales hold denormalized line snapshots, so deletion is
    /// safe for history; it only breaks future purchase of the item.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Inserts or replaces a product under its existing id (bulk import).
    pub async fn upsert(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, category, unit, image, stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price_cents = excluded.price_cents,
                category = excluded.category,
                unit = excluded.unit,
                image = excluded.image,
                stock = excluded.stock
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(&product.image)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products (diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
