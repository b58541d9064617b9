//! # Schema Migrations
//!
//! The store's schema is an ordered, monotonically increasing sequence of
//! additive migrations, applied once each, in order, at every startup.
//!
//! ## Rules
//! - Migrations only add: new tables, new indexed fields with explicit,
//!   documented defaults. No migration deletes or renames a non-empty
//!   table.
//! - A migration already applied is a no-op (tracked in
//!   `_sqlx_migrations`), so startup is idempotent.
//! - A migration that cannot be applied deterministically fails loudly;
//!   each file runs in its own transaction, so the store is never left
//!   partially migrated.
//!
//! ## Adding New Migrations
//! 1. Create the next `NNN_description.sql` in `migrations/sqlite/`
//! 2. Write idempotent SQL (`IF NOT EXISTS` where possible)
//! 3. Never modify an existing migration file

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations, compiled into the binary from
/// `migrations/sqlite/`. No runtime file access needed.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies all pending migrations in order.
///
/// Safe to call on every startup: previously applied versions are
/// skipped, and previously committed records are never touched.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
