//! # Store Handle
//!
//! Connection pool creation and configuration for the SQLite-backed
//! schema store.
//!
//! ## Durability Contract
//! `Store::open` never loses previously committed records: it creates the
//! file only when missing, and startup work is limited to applying
//! pending additive migrations.
//!
//! ## WAL Mode
//! Write-ahead logging lets the live-query recomputations read while the
//! single writer holds its turn, and improves crash recovery.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::cash::CashRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::config::ConfigRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/caja.db").max_connections(5);
/// let store = Store::open(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum pool connections. Default 5; one register terminal does
    /// not need more.
    pub max_connections: u32,

    /// Minimum connections kept alive. Default 1.
    pub min_connections: u32,

    /// Connection acquire timeout. Default 30s.
    pub connect_timeout: Duration,

    /// Idle timeout before a connection is closed. Default 10 minutes.
    pub idle_timeout: Duration,

    /// Whether to apply migrations on open. Default true.
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a configuration for the given database path. The file is
    /// created on first open if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets whether migrations run on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// In-memory store for tests. A single connection, because each
    /// `:memory:` connection is its own database.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle to the schema store: the pool plus repository accessors.
///
/// Cloning is cheap (the pool is internally reference-counted). The
/// single-writer discipline is enforced one level up, by
/// [`crate::register::Register`]; repositories reached through this
/// handle are plain data access.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if missing) the store and applies pending
    /// migrations.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(path = %config.database_path.display(), "Opening store");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let store = Store { pool };

        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }

        Ok(store)
    }

    /// Returns a reference to the connection pool, for queries not
    /// covered by the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Product table access.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Sale ledger access.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Category and unit tag access.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Vendor identity access.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Business configuration singleton access.
    pub fn config(&self) -> ConfigRepository {
        ConfigRepository::new(self.pool.clone())
    }

    /// Daily cash float access.
    pub fn cash(&self) -> CashRepository {
        CashRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }

    /// True when the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_opens_and_migrates() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);

        let (total, applied) = crate::migrations::migration_status(store.pool())
            .await
            .unwrap();
        assert_eq!(total, applied);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_reopen_keeps_records_and_reapplies_nothing() {
        let path = std::env::temp_dir().join(format!(
            "caja-reopen-{}-{:?}.db",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = Store::open(StoreConfig::new(&path)).await.unwrap();
        store
            .catalog()
            .insert_category("Abarrotes")
            .await
            .unwrap();
        store.close().await;

        let store = Store::open(StoreConfig::new(&path)).await.unwrap();
        let (total, applied) = crate::migrations::migration_status(store.pool())
            .await
            .unwrap();
        assert_eq!(total, applied);

        let categories = store.catalog().list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        store.close().await;

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = StoreConfig::new("/tmp/caja.db")
            .max_connections(2)
            .run_migrations(false);
        assert_eq!(config.max_connections, 2);
        assert!(!config.run_migrations);
    }
}
