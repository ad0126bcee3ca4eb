//! Data structures for authentication-related entities.
//!
//! Request and response DTOs for the auth flow. Responses only ever carry
//! the public user projection; the password hash and the stored refresh
//! token never appear here.

use crate::database::models::PublicUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 32,
        message = "Username must be between 3-32 characters"
    ))]
    pub username: String,

    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Login request payload. The identifier matches either username or email.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username_or_email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response containing tokens and user info
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
    /// Access token expiration in seconds
    pub expires_in: u64,
}

/// Token refresh request. The token may also arrive via cookie, in which
/// case the body field is left out.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// A freshly issued token pair, returned by refresh and password change.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Password change request payload
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}
