//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user registration, login, token refreshing, and
//! session teardown. They are designed to be nested into the main router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route(
            "/logout",
            post(logout).layer(middleware::from_fn(access_token_auth)),
        )
        .route(
            "/change-password",
            post(change_password).layer(middleware::from_fn(access_token_auth)),
        )
        .route("/me", get(me).layer(middleware::from_fn(access_token_auth)))
}
