//! # User Repository
//!
//! Vendor identities. A user is a display name attached to sales; there
//! is no authentication.

use sqlx::SqlitePool;
use tracing::debug;

use caja_core::User;

use crate::error::{StoreError, StoreResult};

/// Repository for the users table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users ordered by name.
    pub async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Inserts a user and returns it with its assigned id.
    pub async fn insert(&self, name: &str) -> StoreResult<User> {
        debug!(name, "Inserting user");

        let result = sqlx::query("INSERT INTO users (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Deletes a user. Historical sales keep the vendor name they were
    /// committed with.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", id));
        }

        Ok(())
    }

    /// Inserts or replaces a user under its existing id (bulk import).
    pub async fn upsert(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
