//! Authentication and session management.
//!
//! Registration, login, token refresh with rotation, password change,
//! logout, and the request-level access-token gate.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
