//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and
//! retrieved from the database. Note that these may differ from
//! API-specific models; in particular `User` carries the password hash and
//! the current refresh token, which must never leave the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
    /// The single refresh token this account will accept, or None when
    /// logged out. Overwritten on every login/refresh/password change.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user, safe to serialize into responses.
/// Excludes the password hash and the stored refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            created_at: user.created_at,
        }
    }
}

/// Insert DTO for the users table. Fields are already normalized and the
/// password already hashed by the time this is constructed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Video row joined with the uploader's public handle, as produced by
/// listing queries.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VideoWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub video: Video,
    pub owner_username: String,
    pub owner_avatar_url: Option<String>,
}

/// Insert DTO for the videos table.
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
}

/// Partial update for a video; None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}
