//! Database repositories. All persistence goes through these so the
//! service layer stays storage-agnostic.

pub mod user_repository;
pub mod video_repository;
