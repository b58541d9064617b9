//! # Catalog Repository
//!
//! Categories and units are flat name lists used to tag products.
//! Products store the names denormalized, so renames and deletes here
//! never rewrite the product table.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::{Category, Unit};

use crate::error::{StoreError, StoreResult};

/// Repository for the category and unit tag tables.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Lists all categories ordered by name.
    pub async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Inserts a category and returns it with its assigned id.
    pub async fn insert_category(&self, name: &str) -> StoreResult<Category> {
        debug!(name, "Inserting category");

        let result = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Deletes a category. Products keep their denormalized name.
    pub async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Category", id));
        }

        Ok(())
    }

    /// Inserts or replaces a category under its existing id (bulk import).
    pub async fn upsert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    /// Lists all units ordered by name.
    pub async fn list_units(&self) -> StoreResult<Vec<Unit>> {
        let units = sqlx::query_as::<_, Unit>("SELECT id, name FROM units ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(units)
    }

    /// Inserts a unit and returns it with its assigned id.
    pub async fn insert_unit(&self, name: &str) -> StoreResult<Unit> {
        debug!(name, "Inserting unit");

        let result = sqlx::query("INSERT INTO units (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Unit {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Deletes a unit. Products keep their denormalized name.
    pub async fn delete_unit(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM units WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Unit", id));
        }

        Ok(())
    }

    /// Inserts or replaces a unit under its existing id (bulk import).
    pub async fn upsert_unit(&self, unit: &Unit) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO units (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(unit.id)
        .bind(&unit.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
