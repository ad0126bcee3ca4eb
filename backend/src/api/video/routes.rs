//! Defines the HTTP routes for video publishing and browsing.
//!
//! Every video route resolves the caller's identity when a token is
//! present; browsing never requires one, while mutation routes are
//! additionally gated behind the access-token middleware.

use crate::api::video::handlers::*;
use crate::auth::middleware::{access_token_auth, optional_access_token_auth};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

/// Creates the video router with all video-related routes
pub fn video_router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_videos)
                .merge(post(publish_video).layer(middleware::from_fn(access_token_auth))),
        )
        .route(
            "/{id}",
            get(get_video).merge(
                patch(update_video)
                    .delete(delete_video)
                    .layer(middleware::from_fn(access_token_auth)),
            ),
        )
        .route(
            "/{id}/toggle-publish",
            patch(toggle_publish).layer(middleware::from_fn(access_token_auth)),
        )
        .layer(middleware::from_fn(optional_access_token_auth))
}
