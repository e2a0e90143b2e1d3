use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::ApiError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Find a user by exact username (case-sensitive).
    pub async fn find_by_username(
        db: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with a hashed password.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::DuplicateUsername
            }
            _ => ApiError::Storage(e),
        })?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        db::bootstrap(&pool).await.expect("bootstrap schema");
        pool
    }

    #[tokio::test]
    async fn create_then_find_by_username() {
        let pool = test_pool().await;
        let created = User::create(&pool, "alice", "hash-1").await.expect("create");
        let found = User::find_by_username(&pool, "alice")
            .await
            .expect("query")
            .expect("user exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "hash-1");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let pool = test_pool().await;
        User::create(&pool, "alice", "hash-1").await.expect("create");
        let err = User::create(&pool, "alice", "hash-2").await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUsername));

        // The first user's record is untouched.
        let alice = User::find_by_username(&pool, "alice")
            .await
            .expect("query")
            .expect("user exists");
        assert_eq!(alice.password_hash, "hash-1");
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let pool = test_pool().await;
        User::create(&pool, "Alice", "hash-1").await.expect("create");
        let found = User::find_by_username(&pool, "alice").await.expect("query");
        assert!(found.is_none());
    }
}
