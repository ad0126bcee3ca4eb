//! Middleware for protecting authenticated routes.
//!
//! Validates the access token on inbound requests and loads the caller's
//! identity before the handler runs. The token is taken from the
//! `accessToken` cookie first, then from the Authorization header. All
//! authentication failures (no token, bad signature, expired, account
//! gone) collapse to the same 401 response; only the refresh endpoint
//! distinguishes expired from invalid tokens. A failed database lookup is
//! not an authentication failure and surfaces as a 500.

use crate::api::common::service_error_to_http;
use crate::config::Config;
use crate::database::models::PublicUser;
use crate::errors::ServiceError;
use crate::repositories::user_repository::UserRepository;
use crate::utils::cookies::{ACCESS_TOKEN_COOKIE, cookie_value};
use crate::utils::jwt::JwtKeys;
use axum::{
    extract::{Extension, Request},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

/// The authenticated caller, inserted into request extensions for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

fn unauthenticated() -> ServiceError {
    ServiceError::unauthenticated("Unauthenticated")
}

/// Pull the access token from the cookie, falling back to a bearer header.
fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value(headers, ACCESS_TOKEN_COOKIE) {
        return Some(token);
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Resolves the caller from the request headers. Authentication failures
/// come back as `Unauthenticated`; a failed user lookup keeps its
/// `Database` kind.
async fn resolve_current_user(
    pool: &SqlitePool,
    config: &Config,
    headers: &HeaderMap,
) -> Result<CurrentUser, ServiceError> {
    let token = extract_access_token(headers).ok_or_else(unauthenticated)?;

    let jwt_keys = JwtKeys::new(config);
    let claims = jwt_keys
        .verify_access_token(&token)
        .map_err(|_| unauthenticated())?;

    let repo = UserRepository::new(pool);
    let user = repo
        .get_user_by_id(&claims.sub)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(unauthenticated)?;

    Ok(CurrentUser(PublicUser::from(user)))
}

/// Access token authentication middleware. Stateless: it never refreshes
/// or rotates anything.
pub async fn access_token_auth(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let current_user = resolve_current_user(&pool, &config, request.headers())
        .await
        .map_err(service_error_to_http)?;

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

/// Optional authentication middleware: resolves the identity when a valid
/// token is present but never rejects an unauthenticated request.
/// Handlers receive an `Option<CurrentUser>` either way. A database
/// failure still aborts the request instead of degrading the caller to
/// anonymous.
pub async fn optional_access_token_auth(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let current_user = match resolve_current_user(&pool, &config, request.headers()).await {
        Ok(user) => Some(user),
        Err(error @ ServiceError::Database { .. }) => return Err(service_error_to_http(error)),
        Err(_) => None,
    };

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}
