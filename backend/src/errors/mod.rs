//! Global application error types and handlers.
//!
//! This module defines the error taxonomy shared by every service and
//! handler in the backend. Each operation either produces a success value
//! or exactly one of these kinds; `api::common::service_error_to_http`
//! turns them into the uniform response envelope.

use thiserror::Error;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Login failure. Covers both an unknown username/email and a wrong
    /// password so the caller cannot tell which one it was.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    /// Missing, malformed, or expired access token on a protected route.
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// No refresh token was presented to the refresh endpoint.
    #[error("Refresh token is missing")]
    MissingToken,

    /// Token signature or structure is invalid.
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature is valid but the expiry has elapsed.
    #[error("Token has expired")]
    ExpiredToken,

    /// A well-signed, unexpired refresh token that is no longer the
    /// current one for its user (rotated away, logged out, or forged).
    #[error("Refresh token is no longer valid")]
    StaleToken,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("External service error: {message}")]
    ExternalService { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
