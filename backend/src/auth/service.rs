//! Core business logic for the authentication system.
//!
//! The session model is single-session-per-account: the user row stores at
//! most one current refresh token. Login overwrites it, refresh rotates it
//! through a compare-and-swap, password change replaces it, logout clears
//! it. Any presented refresh token that is not the stored value is stale,
//! even when its signature and expiry check out.

use crate::api::common::validation_message;
use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateUser, PublicUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::JwtKeys;
use crate::utils::password::{hash_password, verify_password};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Authentication service handling registration, login, token rotation,
/// password change, and logout.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_keys: JwtKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        AuthService {
            pool,
            jwt_keys: JwtKeys::new(config),
        }
    }

    /// Register a new user. Username and email are stored lowercased so
    /// uniqueness is case-insensitive.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<PublicUser> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }

        let username = request.username.trim().to_lowercase();
        let email = request.email.trim().to_lowercase();

        let repo = UserRepository::new(self.pool);
        if repo.username_exists(&username).await? {
            return Err(ServiceError::already_exists("User", &username));
        }
        if repo.email_exists(&email).await? {
            return Err(ServiceError::already_exists("User", &email));
        }

        let password_hash = hash_password(&request.password)?;

        let user = repo
            .create_user(CreateUser {
                id: Uuid::now_v7().to_string(),
                username: username.clone(),
                email,
                full_name: request.full_name.trim().to_string(),
                avatar_url: request.avatar_url,
                cover_image_url: request.cover_image_url,
                password_hash,
            })
            .await?;

        tracing::info!("User registered: {}", username);
        Ok(PublicUser::from(user))
    }

    /// Authenticate a user and open a session. An unknown identifier and a
    /// wrong password produce the same error so the caller learns nothing
    /// about which part failed.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }

        let identifier = request.username_or_email.trim().to_lowercase();

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_username_or_email(&identifier)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let access_token = self.jwt_keys.issue_access_token(&user)?;
        let refresh_token = self.jwt_keys.issue_refresh_token(&user.id)?;

        // Overwrites any previous session's refresh token, which makes
        // that session unable to refresh.
        repo.set_refresh_token(&user.id, &refresh_token).await?;

        tracing::info!("User logged in: {}", user.username);
        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: PublicUser::from(user),
            expires_in: self.jwt_keys.access_ttl_seconds() as u64,
        })
    }

    /// Exchange a refresh token for a new token pair, invalidating the
    /// presented token. The rotation is a single conditional update, so of
    /// two concurrent calls with the same token exactly one succeeds.
    pub async fn refresh(&self, presented: Option<String>) -> ServiceResult<TokenPairResponse> {
        let presented = presented.ok_or(ServiceError::MissingToken)?;

        let claims = self.jwt_keys.verify_refresh_token(&presented)?;

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &claims.sub))?;

        let access_token = self.jwt_keys.issue_access_token(&user)?;
        let refresh_token = self.jwt_keys.issue_refresh_token(&user.id)?;

        let rotated = repo
            .rotate_refresh_token(&user.id, &presented, &refresh_token)
            .await?;
        if !rotated {
            tracing::warn!("Stale refresh token presented for user {}", user.id);
            return Err(ServiceError::StaleToken);
        }

        Ok(TokenPairResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_keys.access_ttl_seconds() as u64,
        })
    }

    /// Change the password and rotate the session. The old refresh token
    /// stops working immediately, which forces other holders of the
    /// account's session to log in again.
    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> ServiceResult<TokenPairResponse> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        if !verify_password(&request.old_password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let password_hash = hash_password(&request.new_password)?;
        let access_token = self.jwt_keys.issue_access_token(&user)?;
        let refresh_token = self.jwt_keys.issue_refresh_token(&user.id)?;

        repo.update_password_and_refresh_token(&user.id, &password_hash, &refresh_token)
            .await?;

        tracing::info!("Password changed for user {}", user.id);
        Ok(TokenPairResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_keys.access_ttl_seconds() as u64,
        })
    }

    /// Close the session by clearing the stored refresh token. Logging out
    /// twice is not an error.
    pub async fn logout(&self, user_id: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        repo.clear_refresh_token(user_id).await?;

        tracing::info!("User logged out: {}", user_id);
        Ok(())
    }

    /// Cookie/response lifetime of issued access tokens.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.jwt_keys.access_ttl_seconds()
    }

    /// Cookie lifetime of issued refresh tokens.
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.jwt_keys.refresh_ttl_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: username.to_string(),
            password: password.to_string(),
            avatar_url: None,
            cover_image_url: None,
        }
    }

    fn login_request(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username_or_email: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();

        // Same username, different case.
        let mut dup = register_request("Alice", "password-2");
        dup.email = "other@example.com".to_string();
        assert!(matches!(
            service.register(dup).await,
            Err(ServiceError::AlreadyExists { .. })
        ));

        let mut dup = register_request("bob", "password-2");
        dup.email = "ALICE@example.com".to_string();
        assert!(matches!(
            service.register(dup).await,
            Err(ServiceError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn register_response_carries_no_secrets() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        let user = service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();

        let serialized = serde_json::to_string(&user).unwrap();
        assert!(!serialized.contains("password"));
        assert!(!serialized.contains("refresh"));
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();

        service
            .login(login_request("alice", "password-1"))
            .await
            .unwrap();
        service
            .login(login_request("alice@example.com", "password-1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_failure_is_uniform() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();

        // Unknown user and wrong password fail identically.
        let unknown = service.login(login_request("nobody", "password-1")).await;
        let wrong = service.login(login_request("alice", "wrong")).await;

        assert!(matches!(unknown, Err(ServiceError::InvalidCredentials)));
        assert!(matches!(wrong, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();
        let login = service
            .login(login_request("alice", "password-1"))
            .await
            .unwrap();

        let r1 = login.refresh_token;
        let pair2 = service.refresh(Some(r1.clone())).await.unwrap();
        assert_ne!(pair2.refresh_token, r1);

        // R1 is spent.
        assert!(matches!(
            service.refresh(Some(r1)).await,
            Err(ServiceError::StaleToken)
        ));

        // The chain continues from R2, and each step invalidates its
        // predecessor.
        let pair3 = service
            .refresh(Some(pair2.refresh_token.clone()))
            .await
            .unwrap();
        assert!(matches!(
            service.refresh(Some(pair2.refresh_token)).await,
            Err(ServiceError::StaleToken)
        ));
        service.refresh(Some(pair3.refresh_token)).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_requires_a_token() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        assert!(matches!(
            service.refresh(None).await,
            Err(ServiceError::MissingToken)
        ));
        assert!(matches!(
            service.refresh(Some("garbage".to_string())).await,
            Err(ServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn logout_invalidates_refresh_and_is_idempotent() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        let user = service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();
        let login = service
            .login(login_request("alice", "password-1"))
            .await
            .unwrap();

        service.logout(&user.id).await.unwrap();
        service.logout(&user.id).await.unwrap();

        assert!(matches!(
            service.refresh(Some(login.refresh_token)).await,
            Err(ServiceError::StaleToken)
        ));
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        let user = service
            .register(register_request("alice", "password-1"))
            .await
            .unwrap();

        let denied = service
            .change_password(
                &user.id,
                ChangePasswordRequest {
                    old_password: "wrong".to_string(),
                    new_password: "password-2".to_string(),
                },
            )
            .await;

        assert!(matches!(denied, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);

        let user = service
            .register(register_request("u1", "password-1"))
            .await
            .unwrap();

        // login -> (A1, R1)
        let login = service
            .login(login_request("u1", "password-1"))
            .await
            .unwrap();
        let r1 = login.refresh_token;

        // refresh(R1) -> (A2, R2); refresh(R1) again is stale.
        let pair2 = service.refresh(Some(r1.clone())).await.unwrap();
        assert!(matches!(
            service.refresh(Some(r1)).await,
            Err(ServiceError::StaleToken)
        ));

        // change password -> (A3, R3); R2 is now stale too.
        let pair3 = service
            .change_password(
                &user.id,
                ChangePasswordRequest {
                    old_password: "password-1".to_string(),
                    new_password: "password-2".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            service.refresh(Some(pair2.refresh_token)).await,
            Err(ServiceError::StaleToken)
        ));

        // Old password no longer logs in; the new one does, and R3 was
        // still usable up to that point.
        assert!(matches!(
            service.login(login_request("u1", "password-1")).await,
            Err(ServiceError::InvalidCredentials)
        ));
        service.refresh(Some(pair3.refresh_token)).await.unwrap();
        service
            .login(login_request("u1", "password-2"))
            .await
            .unwrap();
    }
}
