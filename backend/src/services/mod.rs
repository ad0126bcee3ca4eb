//! Business logic services.

pub mod media_service;
pub mod video_service;
