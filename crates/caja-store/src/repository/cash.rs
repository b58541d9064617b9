//! # Cash Repository
//!
//! Opening floats keyed by local calendar day. Only the opening amount
//! is stored; the drawer total is always derived as opening plus the
//! day's sales sum, never persisted.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::DailyCash;

use crate::error::StoreResult;

/// Repository for the daily cash table.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Gets the opening float for a day, if one was recorded.
    pub async fn opening(&self, day: &str) -> StoreResult<Option<DailyCash>> {
        let cash = sqlx::query_as::<_, DailyCash>(
            "SELECT day, opening_cents FROM daily_cash WHERE day = ?1",
        )
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cash)
    }

    /// Sets the opening float for a day. Re-setting replaces the amount
    /// for the same day without creating a second record.
    pub async fn set_opening(&self, day: &str, opening_cents: i64) -> StoreResult<DailyCash> {
        debug!(day, opening_cents, "Setting opening float");

        sqlx::query(
            r#"
            INSERT INTO daily_cash (day, opening_cents) VALUES (?1, ?2)
            ON CONFLICT(day) DO UPDATE SET opening_cents = excluded.opening_cents
            "#,
        )
        .bind(day)
        .bind(opening_cents)
        .execute(&self.pool)
        .await?;

        Ok(DailyCash {
            day: day.to_string(),
            opening_cents,
        })
    }

    /// Lists all recorded opening floats, oldest day first.
    pub async fn list(&self) -> StoreResult<Vec<DailyCash>> {
        let entries =
            sqlx::query_as::<_, DailyCash>("SELECT day, opening_cents FROM daily_cash ORDER BY day")
                .fetch_all(&self.pool)
                .await?;

        Ok(entries)
    }
}
