//! # Config Repository
//!
//! The business configuration singleton (row id 1). Receipts read it at
//! assembly time; until the owner fills it in, `get` returns `None` and
//! callers fall back to empty defaults.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::BusinessConfig;

use crate::error::StoreResult;

/// Repository for the single-row config table.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Gets the business configuration, if it has been set.
    pub async fn get(&self) -> StoreResult<Option<BusinessConfig>> {
        let config = sqlx::query_as::<_, BusinessConfig>(
            "SELECT name, tax_id, address, phone FROM config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Sets the business configuration, replacing any previous value.
    pub async fn set(&self, config: &BusinessConfig) -> StoreResult<()> {
        debug!(name = %config.name, "Setting business config");

        sqlx::query(
            r#"
            INSERT INTO config (id, name, tax_id, address, phone)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                tax_id = excluded.tax_id,
                address = excluded.address,
                phone = excluded.phone
            "#,
        )
        .bind(&config.name)
        .bind(&config.tax_id)
        .bind(&config.address)
        .bind(&config.phone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
