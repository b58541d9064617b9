//! # Sale Repository
//!
//! Append-only access to the sale ledger.
//!
//! ## Immutability
//! A sale row is written exactly once, by `append`. There is no update
//! method on purpose: the ledger is the financial source of truth and
//! its line snapshots must never change after commit. The only other
//! write path is `upsert`, used by bulk import to merge records by id.
//!
//! Line items are stored as a JSON snapshot inside the row, so the
//! sale-plus-lines append is a single atomic insert.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use caja_core::{DocumentType, Sale, SaleLine};

use crate::error::StoreResult;

/// Row shape of the `sales` table; `lines` is the raw JSON column.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    document_type: DocumentType,
    document_number: String,
    created_at: DateTime<Utc>,
    day: String,
    vendor: String,
    client_tax_id: Option<String>,
    lines: String,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_cents: i64,
    change_cents: i64,
}

impl SaleRow {
    fn into_sale(self) -> StoreResult<Sale> {
        let lines: Vec<SaleLine> = serde_json::from_str(&self.lines)?;
        Ok(Sale {
            id: self.id,
            document_type: self.document_type,
            document_number: self.document_number,
            created_at: self.created_at,
            day: self.day,
            vendor: self.vendor,
            client_tax_id: self.client_tax_id,
            lines,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            payment_cents: self.payment_cents,
            change_cents: self.change_cents,
        })
    }
}

const SALE_COLUMNS: &str = "id, document_type, document_number, created_at, day, vendor, \
     client_tax_id, lines, subtotal_cents, discount_cents, total_cents, \
     payment_cents, change_cents";

/// Repository for the sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Appends an immutable sale and returns it with its assigned id.
    ///
    /// The caller passes a fully computed sale (id 0); totals are never
    /// recomputed here.
    pub async fn append(&self, sale: &Sale) -> StoreResult<Sale> {
        debug!(
            document_number = %sale.document_number,
            total_cents = sale.total_cents,
            "Appending sale"
        );

        let lines_json = serde_json::to_string(&sale.lines)?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                document_type, document_number, created_at, day, vendor,
                client_tax_id, lines, subtotal_cents, discount_cents,
                total_cents, payment_cents, change_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(sale.document_type)
        .bind(&sale.document_number)
        .bind(sale.created_at)
        .bind(&sale.day)
        .bind(&sale.vendor)
        .bind(&sale.client_tax_id)
        .bind(lines_json)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_cents)
        .bind(sale.change_cents)
        .execute(&self.pool)
        .await?;

        let mut committed = sale.clone();
        committed.id = result.last_insert_rowid();
        Ok(committed)
    }

    /// Gets a sale by id.
    pub async fn get(&self, id: i64) -> StoreResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> StoreResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Lists the sales of one local calendar day, oldest first.
    pub async fn list_for_day(&self, day: &str) -> StoreResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE day = ?1 ORDER BY id"
        ))
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Sum of `total_cents` over one local calendar day.
    pub async fn total_for_day(&self, day: &str) -> StoreResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM sales WHERE day = ?1")
                .bind(day)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    /// Inserts or replaces a sale under its existing id (bulk import
    /// only - the commit path always goes through `append`).
    pub async fn upsert(&self, sale: &Sale) -> StoreResult<()> {
        let lines_json = serde_json::to_string(&sale.lines)?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, document_type, document_number, created_at, day, vendor,
                client_tax_id, lines, subtotal_cents, discount_cents,
                total_cents, payment_cents, change_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                document_type = excluded.document_type,
                document_number = excluded.document_number,
                created_at = excluded.created_at,
                day = excluded.day,
                vendor = excluded.vendor,
                client_tax_id = excluded.client_tax_id,
                lines = excluded.lines,
                subtotal_cents = excluded.subtotal_cents,
                discount_cents = excluded.discount_cents,
                total_cents = excluded.total_cents,
                payment_cents = excluded.payment_cents,
                change_cents = excluded.change_cents
            "#,
        )
        .bind(sale.id)
        .bind(sale.document_type)
        .bind(&sale.document_number)
        .bind(sale.created_at)
        .bind(&sale.day)
        .bind(&sale.vendor)
        .bind(&sale.client_tax_id)
        .bind(lines_json)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_cents)
        .bind(sale.change_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts ledger entries (diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
