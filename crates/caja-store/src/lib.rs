//! # caja-store: SQLite Persistence for the librecaja Register
//!
//! Durable, local-first storage for the register's records, plus the
//! reactive read layer and the single-writer facade.
//!
//! ## Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      Register (register)                      │
//! │   writer turn • one ChangeSet per logical op • commit engine  │
//! └───────┬───────────────────────────────────────────┬───────────┘
//!         │ repository calls                          │ publish
//! ┌───────▼───────────────────────────┐   ┌───────────▼───────────┐
//! │     repositories (repository)     │   │  LiveQueryEngine      │
//! │  products sales catalog users     │   │  (live) watch-channel │
//! │  config cash                      │   │  recomputation        │
//! └───────┬───────────────────────────┘   └───────────────────────┘
//!         │ sqlx
//! ┌───────▼───────────────────────────────────────────────────────┐
//! │   SQLite file (WAL) • additive migrations on open (pool)      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Store handle, connection options, migrations on open
//! - [`migrations`] - Embedded additive schema migrations
//! - [`repository`] - Plain per-table data access
//! - [`live`] - Reactive query engine (watch channels)
//! - [`register`] - Single-writer facade and sale-commit engine
//! - [`backup`] - Export/import snapshot types
//! - [`error`] - Store error types

pub mod backup;
pub mod error;
pub mod live;
pub mod migrations;
pub mod pool;
pub mod register;
pub mod repository;

// Re-exports for convenience
pub use backup::Snapshot;
pub use error::{StoreError, StoreResult};
pub use live::{ChangeSet, LiveQuery, LiveQueryEngine, Table};
pub use pool::{Store, StoreConfig};
pub use register::{CommitOutcome, Register};
