//! JWT token utilities for authentication.
//!
//! Access and refresh tokens are signed with two distinct secrets. The
//! access token carries a denormalized snapshot of the user's identity;
//! the refresh token carries only the subject id. Verification
//! distinguishes an elapsed expiry from any other decode failure, because
//! clients react differently to the two (expired access token: try a
//! refresh; invalid token: force a re-login).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Token issued at timestamp
    pub iat: usize,
    /// Token expiration timestamp
    pub exp: usize,
}

/// Claims carried by a refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// User ID
    pub sub: String,
    /// Unique token id. Guarantees two tokens for the same user are never
    /// byte-identical, which the stored-value comparison relies on.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

/// Token signing and verification keys, built once from config.
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Exact expiry; the default 60s leeway would let just-expired
        // tokens through.
        validation.leeway = 0;

        JwtKeys {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl_seconds: config.access_token_expires_in_seconds as i64,
            refresh_ttl_seconds: (config.refresh_token_expires_in_days * 24 * 60 * 60) as i64,
            validation,
        }
    }

    /// Lifetime of issued access tokens, for the `expires_in` response
    /// field and the cookie max-age.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    /// Sign a new access token snapshotting the user's identity fields.
    pub fn issue_access_token(&self, user: &User) -> ServiceResult<String> {
        self.sign_access_token(user, self.access_ttl_seconds)
    }

    /// Sign a new refresh token for the given user id.
    pub fn issue_refresh_token(&self, user_id: &str) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.refresh_ttl_seconds);

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: uuid::Uuid::now_v7().to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| ServiceError::internal_error(format!("Token signing failed: {e}")))
    }

    /// Validate and decode an access token.
    pub fn verify_access_token(&self, token: &str) -> ServiceResult<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Validate and decode a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> ServiceResult<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    fn sign_access_token(&self, user: &User, ttl_seconds: i64) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_seconds);

        let claims = AccessClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| ServiceError::internal_error(format!("Token signing failed: {e}")))
    }

    /// Sign an access token with an arbitrary lifetime, for expiry tests.
    #[cfg(test)]
    pub fn issue_access_token_with_ttl(
        &self,
        user: &User,
        ttl_seconds: i64,
    ) -> ServiceResult<String> {
        self.sign_access_token(user, ttl_seconds)
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> ServiceError {
    match error.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::ExpiredToken,
        _ => ServiceError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: "user-1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice".to_string(),
            avatar_url: None,
            cover_image_url: None,
            password_hash: "irrelevant".to_string(),
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let keys = JwtKeys::new(&Config::for_tests());
        let user = sample_user();

        let token = keys.issue_access_token(&user).unwrap();
        let claims = keys.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_round_trip() {
        let keys = JwtKeys::new(&Config::for_tests());

        let token = keys.issue_refresh_token("user-1").unwrap();
        let claims = keys.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn refresh_tokens_are_unique() {
        let keys = JwtKeys::new(&Config::for_tests());

        let first = keys.issue_refresh_token("user-1").unwrap();
        let second = keys.issue_refresh_token("user-1").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let keys = JwtKeys::new(&Config::for_tests());
        let mut other_config = Config::for_tests();
        other_config.access_token_secret = "a-different-secret".to_string();
        let other_keys = JwtKeys::new(&other_config);

        let token = keys.issue_access_token(&sample_user()).unwrap();

        assert!(matches!(
            other_keys.verify_access_token(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn refresh_token_does_not_verify_as_access_token() {
        let keys = JwtKeys::new(&Config::for_tests());
        let token = keys.issue_refresh_token("user-1").unwrap();

        assert!(matches!(
            keys.verify_access_token(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn expired_access_token_is_rejected_as_expired() {
        let keys = JwtKeys::new(&Config::for_tests());
        let token = keys
            .issue_access_token_with_ttl(&sample_user(), -10)
            .unwrap();

        assert!(matches!(
            keys.verify_access_token(&token),
            Err(ServiceError::ExpiredToken)
        ));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let keys = JwtKeys::new(&Config::for_tests());

        assert!(matches!(
            keys.verify_refresh_token("not-a-token"),
            Err(ServiceError::InvalidToken)
        ));
    }
}
