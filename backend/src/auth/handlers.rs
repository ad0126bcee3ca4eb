//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse incoming requests, delegate to `auth::service`
//! for the business logic, and shape the HTTP response. Tokens are
//! delivered twice: as http-only cookies for browsers and in the JSON body
//! for non-browser clients.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::middleware::CurrentUser;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::models::PublicUser;
use crate::utils::cookies::{
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, auth_cookie, cookie_value, expired_cookie,
};
use axum::{
    body::Bytes,
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use sqlx::SqlitePool;

fn token_cookies(
    service: &AuthService<'_>,
    access_token: &str,
    refresh_token: &str,
) -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (
            SET_COOKIE,
            auth_cookie(
                ACCESS_TOKEN_COOKIE,
                access_token,
                service.access_ttl_seconds(),
            ),
        ),
        (
            SET_COOKIE,
            auth_cookie(
                REFRESH_TOKEN_COOKIE,
                refresh_token,
                service.refresh_ttl_seconds(),
            ),
        ),
    ])
}

fn cleared_cookies() -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (SET_COOKIE, expired_cookie(ACCESS_TOKEN_COOKIE)),
        (SET_COOKIE, expired_cookie(REFRESH_TOKEN_COOKIE)),
    ])
}

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.register(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(user, "User registered successfully")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.login(payload).await {
        Ok(response) => {
            let cookies = token_cookies(
                &auth_service,
                &response.access_token,
                &response.refresh_token,
            );
            Ok((
                cookies,
                Json(ApiResponse::success(response, "User logged in successfully")),
            ))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh request. The refresh token comes from the cookie
/// when present, otherwise from the request body. The body is parsed
/// leniently because browser clients send none at all.
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    let presented = cookie_value(&headers, REFRESH_TOKEN_COOKIE).or_else(|| {
        serde_json::from_slice::<RefreshTokenRequest>(&body)
            .ok()
            .and_then(|payload| payload.refresh_token)
    });

    match auth_service.refresh(presented).await {
        Ok(response) => {
            let cookies = token_cookies(
                &auth_service,
                &response.access_token,
                &response.refresh_token,
            );
            Ok((
                cookies,
                Json(ApiResponse::success(response, "Session refreshed")),
            ))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request: clears the stored refresh token and expires the
/// auth cookies.
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.logout(&current_user.0.id).await {
        Ok(()) => Ok((
            cleared_cookies(),
            Json(ApiResponse::success(
                serde_json::json!({}),
                "Logged out successfully",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle password change request. Issues a fresh token pair; the previous
/// refresh token stops working.
#[axum::debug_handler]
pub async fn change_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.change_password(&current_user.0.id, payload).await {
        Ok(response) => {
            let cookies = token_cookies(
                &auth_service,
                &response.access_token,
                &response.refresh_token,
            );
            Ok((
                cookies,
                Json(ApiResponse::success(response, "Password changed successfully")),
            ))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Get current user information from the request context
#[axum::debug_handler]
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::success(
        current_user.0,
        "User retrieved successfully",
    ))
}
