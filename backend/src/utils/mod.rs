//! Shared utilities: token signing, password hashing, and cookie handling.

pub mod cookies;
pub mod jwt;
pub mod password;
