//! Database repository for user management operations.
//!
//! Handles all persistence for the User entity, including the stored
//! refresh token. Rotation uses a conditional update so two concurrent
//! refresh calls with the same token cannot both succeed.

use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, full_name, avatar_url, cover_image_url, \
     password_hash, refresh_token, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database. A unique-constraint violation
    /// on username or email maps to `AlreadyExists`, which also covers the
    /// window between the caller's duplicate checks and this insert.
    pub async fn create_user(&self, user: CreateUser) -> ServiceResult<User> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, full_name, avatar_url, cover_image_url, \
             password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|err| {
            if let Some(db_err) = err.as_database_error() {
                if db_err.is_unique_violation() {
                    let identifier = if db_err.message().contains("email") {
                        user.email.as_str()
                    } else {
                        user.username.as_str()
                    };
                    return ServiceError::already_exists("User", identifier);
                }
            }
            ServiceError::Database { source: err.into() }
        })?;

        Ok(created)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Looks up a user by username or email; either one matches.
    /// The identifier is expected to be lowercased by the caller.
    pub async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ?"
        ))
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if a username already exists in the system.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
                .bind(username)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Stores a new current refresh token, replacing whatever was there.
    /// Used at login, where any previous session is deliberately evicted.
    pub async fn set_refresh_token(&self, id: &str, refresh_token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?")
            .bind(refresh_token)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Compare-and-swap rotation: installs `next` only if `current` is
    /// still the stored token. Returns false when the stored value has
    /// moved on (already rotated, logged out, or never known).
    pub async fn rotate_refresh_token(
        &self,
        id: &str,
        current: &str,
        next: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = ?, updated_at = ? \
             WHERE id = ? AND refresh_token = ?",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(current)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the stored refresh token. Idempotent.
    pub async fn clear_refresh_token(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Replaces the password hash and the refresh token in one statement,
    /// so a password change atomically invalidates the old session.
    pub async fn update_password_and_refresh_token(
        &self,
        id: &str,
        password_hash: &str,
        refresh_token: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = ?, refresh_token = ?, updated_at = ? WHERE id = ?",
        )
        .bind(password_hash)
        .bind(refresh_token)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
