//! API modules: shared plumbing and the per-entity route handlers.

pub mod common;
pub mod video;
