//! Request DTOs for the video API.

use serde::Deserialize;
use validator::Validate;

/// Publish request. File paths point at server-local staging files; the
/// media host turns them into hosted URLs.
#[derive(Debug, Deserialize, Validate)]
pub struct PublishVideoRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Video file is required"))]
    pub video_file_path: String,

    #[validate(length(min = 1, message = "Thumbnail file is required"))]
    pub thumbnail_path: String,
}

/// Partial update; at least one field must be present.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub thumbnail_path: Option<String>,
}

/// Query parameters for video listing.
#[derive(Debug, Default, Deserialize)]
pub struct VideoListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Restrict the listing to one uploader's videos.
    pub owner_id: Option<String>,
    /// Substring match on title or description.
    pub query: Option<String>,
    /// Sort key: created_at (default), views, duration, or title.
    pub sort_by: Option<String>,
    /// Sort direction: asc or desc (default).
    pub sort_order: Option<String>,
}
