//! Handler functions for video API endpoints.
//!
//! These functions process requests for publishing and browsing videos,
//! delegate to the `VideoService`, and wrap results in the standard
//! response envelope.

use crate::api::common::{ApiResponse, PaginatedData, PaginationMeta, service_error_to_http};
use crate::api::video::models::{PublishVideoRequest, UpdateVideoRequest, VideoListQuery};
use crate::auth::middleware::CurrentUser;
use crate::database::models::{Video, VideoWithOwner};
use crate::services::media_service::MediaHost;
use crate::services::video_service::VideoService;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// List videos visible to the caller, paginated.
#[axum::debug_handler]
pub async fn list_videos(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<Option<CurrentUser>>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<ApiResponse<PaginatedData<VideoWithOwner>>>, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);
    let viewer_id = current_user.as_ref().map(|user| user.0.id.as_str());

    match video_service.list_videos(query, viewer_id).await {
        Ok((videos, total, pagination)) => {
            let meta = PaginationMeta::from_filter(&pagination, total);
            Ok(Json(ApiResponse::paginated(
                PaginatedData::new(videos, total),
                meta,
                "Videos fetched successfully",
            )))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Publish a new video owned by the caller.
#[axum::debug_handler]
pub async fn publish_video(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(media_host): Extension<Arc<dyn MediaHost>>,
    Json(payload): Json<PublishVideoRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);

    match video_service
        .publish_video(&current_user.0.id, payload, media_host.as_ref())
        .await
    {
        Ok(video) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(video, "Video published successfully")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Fetch a single video and count the view.
#[axum::debug_handler]
pub async fn get_video(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<Option<CurrentUser>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Video>>, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);
    let viewer_id = current_user.as_ref().map(|user| user.0.id.as_str());

    match video_service.get_video(&id, viewer_id).await {
        Ok(video) => Ok(Json(ApiResponse::success(
            video,
            "Video fetched successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Update video details. Owner only.
#[axum::debug_handler]
pub async fn update_video(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<CurrentUser>,
    Extension(media_host): Extension<Arc<dyn MediaHost>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateVideoRequest>,
) -> Result<Json<ApiResponse<Video>>, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);

    match video_service
        .update_video(&id, &current_user.0.id, payload, media_host.as_ref())
        .await
    {
        Ok(video) => Ok(Json(ApiResponse::success(
            video,
            "Video details updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Delete a video. Owner only.
#[axum::debug_handler]
pub async fn delete_video(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);

    match video_service.delete_video(&id, &current_user.0.id).await {
        Ok(()) => Ok(Json(ApiResponse::success(
            serde_json::json!({}),
            "Video deleted successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Flip the publish flag. Owner only.
#[axum::debug_handler]
pub async fn toggle_publish(
    Extension(pool): Extension<SqlitePool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, (StatusCode, String)> {
    let video_service = VideoService::new(&pool);

    match video_service.toggle_publish(&id, &current_user.0.id).await {
        Ok(video) => Ok(Json(ApiResponse::success(
            serde_json::json!({ "is_published": video.is_published }),
            "Video publish status toggled successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
