//! Main entry point for the video-hosting backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection and the media-host client, and registers all API routes and
//! middleware. It orchestrates the application's startup and defines its
//! overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::services::media_service::{HttpMediaHost, MediaHost};
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();
    let media_host: Arc<dyn MediaHost> = Arc::new(HttpMediaHost::new(&config));

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router())
        .nest("/api/video", api::video::routes::video_router())
        .layer(Extension(pool))
        .layer(Extension(config.clone()))
        .layer(Extension(media_host));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Video Hosting Backend",
            "version": "0.1.0"
        }),
        "Welcome to the video hosting API",
    ))
}
