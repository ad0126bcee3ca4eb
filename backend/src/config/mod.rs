//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, token secrets, and token lifetimes.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expires_in_seconds: u64,
    pub refresh_token_expires_in_days: u64,
    pub media_upload_url: String,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let access_token_secret =
            env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET not set")?;

        let refresh_token_secret =
            env::var("REFRESH_TOKEN_SECRET").context("REFRESH_TOKEN_SECRET not set")?;

        let access_token_expires_in_seconds = env::var("ACCESS_TOKEN_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .context("ACCESS_TOKEN_EXPIRES_IN_SECONDS must be a valid number")?;

        let refresh_token_expires_in_days = env::var("REFRESH_TOKEN_EXPIRES_IN_DAYS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("REFRESH_TOKEN_EXPIRES_IN_DAYS must be a valid number")?;

        let media_upload_url = env::var("MEDIA_UPLOAD_URL")
            .unwrap_or_else(|_| "http://localhost:9000/upload".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            access_token_secret,
            refresh_token_secret,
            access_token_expires_in_seconds,
            refresh_token_expires_in_days,
            media_upload_url,
            server_port,
        })
    }

    /// Fixed configuration for unit tests. Secrets are test-only values.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
            access_token_expires_in_seconds: 900,
            refresh_token_expires_in_days: 10,
            media_upload_url: "http://localhost:9000/upload".to_string(),
            server_port: 3000,
        }
    }
}
