//! Video business logic service.
//!
//! Publishing uploads through the media-host contract, browsing applies
//! the visibility rule (unpublished videos exist only for their owner),
//! and every mutation checks ownership.

use crate::api::common::{PaginationFilter, validation_message};
use crate::api::video::models::{PublishVideoRequest, UpdateVideoRequest, VideoListQuery};
use crate::database::models::{CreateVideo, UpdateVideo, Video, VideoWithOwner};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::video_repository::{
    SortOrder, VideoListFilter, VideoRepository, VideoSort,
};
use crate::services::media_service::MediaHost;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;
use validator::Validate;

pub struct VideoService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> VideoService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Publish a new video: upload the file and its thumbnail, then
    /// persist the record with the duration the media host reported.
    pub async fn publish_video(
        &self,
        owner_id: &str,
        request: PublishVideoRequest,
        media_host: &dyn MediaHost,
    ) -> ServiceResult<Video> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }

        let video_asset = media_host.upload(Path::new(&request.video_file_path)).await?;
        let thumbnail_asset = media_host.upload(Path::new(&request.thumbnail_path)).await?;

        let repo = VideoRepository::new(self.pool);
        let video = repo
            .create_video(CreateVideo {
                id: Uuid::now_v7().to_string(),
                owner_id: owner_id.to_string(),
                title: request.title.trim().to_string(),
                description: request.description.trim().to_string(),
                video_url: video_asset.url,
                thumbnail_url: thumbnail_asset.url,
                duration_seconds: video_asset.duration_seconds.unwrap_or(0.0),
            })
            .await?;

        tracing::info!("Video published: {} by {}", video.id, owner_id);
        Ok(video)
    }

    /// List videos visible to the viewer, newest first unless a sort is
    /// requested, with the total count for pagination metadata.
    pub async fn list_videos(
        &self,
        query: VideoListQuery,
        viewer_id: Option<&str>,
    ) -> ServiceResult<(Vec<VideoWithOwner>, u64, PaginationFilter)> {
        let pagination = PaginationFilter {
            page: query.page,
            per_page: query.per_page,
        };
        if let Err(errors) = pagination.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }

        let sort = match query.sort_by.as_deref() {
            None => VideoSort::default(),
            Some(value) => VideoSort::from_param(value).ok_or_else(|| {
                ServiceError::validation(format!("Unknown sort key '{value}'"))
            })?,
        };
        let order = match query.sort_order.as_deref() {
            None => SortOrder::default(),
            Some(value) => SortOrder::from_param(value).ok_or_else(|| {
                ServiceError::validation(format!("Unknown sort direction '{value}'"))
            })?,
        };

        let filter = VideoListFilter {
            owner_id: query.owner_id,
            query: query.query,
            viewer_id: viewer_id.map(|id| id.to_string()),
            sort,
            order,
        };

        let repo = VideoRepository::new(self.pool);
        let videos = repo.list_videos(&filter, &pagination).await?;
        let total = repo.count_videos(&filter).await?;

        Ok((videos, total, pagination))
    }

    /// Fetch a single video and count the view. An unpublished video is
    /// indistinguishable from a missing one for everybody but its owner.
    pub async fn get_video(&self, id: &str, viewer_id: Option<&str>) -> ServiceResult<Video> {
        let repo = VideoRepository::new(self.pool);
        let video = repo
            .get_video_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Video", id))?;

        if !video.is_published && viewer_id != Some(video.owner_id.as_str()) {
            return Err(ServiceError::not_found("Video", id));
        }

        repo.increment_views(id).await?;

        Ok(Video {
            views: video.views + 1,
            ..video
        })
    }

    /// Update title, description, or thumbnail. Owner only.
    pub async fn update_video(
        &self,
        id: &str,
        caller_id: &str,
        request: UpdateVideoRequest,
        media_host: &dyn MediaHost,
    ) -> ServiceResult<Video> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::validation(validation_message(&errors)));
        }
        if request.title.is_none()
            && request.description.is_none()
            && request.thumbnail_path.is_none()
        {
            return Err(ServiceError::validation(
                "At least one of title, description, or thumbnail must be provided",
            ));
        }

        self.get_owned_video(id, caller_id, "update").await?;

        let thumbnail_url = match &request.thumbnail_path {
            Some(path) => Some(media_host.upload(Path::new(path)).await?.url),
            None => None,
        };

        let repo = VideoRepository::new(self.pool);
        let updated = repo
            .update_video(
                id,
                UpdateVideo {
                    title: request.title,
                    description: request.description,
                    thumbnail_url,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("Video", id))?;

        Ok(updated)
    }

    /// Delete a video. Owner only.
    pub async fn delete_video(&self, id: &str, caller_id: &str) -> ServiceResult<()> {
        self.get_owned_video(id, caller_id, "delete").await?;

        let repo = VideoRepository::new(self.pool);
        repo.delete_video(id).await?;

        tracing::info!("Video deleted: {} by {}", id, caller_id);
        Ok(())
    }

    /// Flip the publish flag. Owner only.
    pub async fn toggle_publish(&self, id: &str, caller_id: &str) -> ServiceResult<Video> {
        let video = self.get_owned_video(id, caller_id, "change the publish status of").await?;

        let repo = VideoRepository::new(self.pool);
        repo.set_published(id, !video.is_published).await?;

        Ok(Video {
            is_published: !video.is_published,
            ..video
        })
    }

    async fn get_owned_video(
        &self,
        id: &str,
        caller_id: &str,
        action: &str,
    ) -> ServiceResult<Video> {
        let repo = VideoRepository::new(self.pool);
        let video = repo
            .get_video_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Video", id))?;

        if video.owner_id != caller_id {
            return Err(ServiceError::permission_denied(format!(
                "You are not allowed to {action} this video"
            )));
        }

        Ok(video)
    }
}
