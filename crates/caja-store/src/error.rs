//! # Store Error Types
//!
//! Error types for the persistence layer.
//!
//! ## Error Flow
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  SQLite error (sqlx::Error)                                   │
//! │       │                                                       │
//! │       ▼                                                       │
//! │  StoreError (this module) ← adds context and categorization   │
//! │       ▲                                                       │
//! │       │                                                       │
//! │  CoreError / CheckoutError ← rejections bubble up unchanged   │
//! │  so callers can show the specific user-facing reason          │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use caja_core::{CheckoutError, CoreError, ValidationError};
use thiserror::Error;

/// Persistence and commit errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g. duplicate tag name).
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Database file could not be opened or the pool failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration could not be applied deterministically.
    /// Fatal at startup: the store never partially applies a migration.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Sale line snapshot could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A business rule rejected the operation; no state was touched.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

impl From<CheckoutError> for StoreError {
    fn from(err: CheckoutError) -> Self {
        StoreError::Core(CoreError::Checkout(err))
    }
}

/// Classify sqlx errors by SQLite constraint message.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation(msg)
                } else {
                    StoreError::QueryFailed(msg)
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::ConnectionFailed(err.to_string())
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
