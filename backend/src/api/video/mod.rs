//! Video publishing and browsing API.

pub mod handlers;
pub mod models;
pub mod routes;
