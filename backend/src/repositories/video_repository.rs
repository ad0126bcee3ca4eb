//! Database repository for video management operations.
//!
//! Listing supports pagination, sorting, an owner filter, and a text
//! search over title and description; rows come back joined with the
//! uploader's handle. Unpublished videos are only visible to their
//! owner; the visibility rule lives in the SQL so counting and listing
//! cannot disagree.

use crate::api::common::PaginationFilter;
use crate::database::models::{CreateVideo, UpdateVideo, Video, VideoWithOwner};
use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Sort keys the listing accepts. Parsed from the query string before a
/// filter is built; only these names ever reach the SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSort {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSort {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAt),
            "views" => Some(Self::Views),
            "duration" => Some(Self::Duration),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "videos.created_at",
            Self::Views => "videos.views",
            Self::Duration => "videos.duration_seconds",
            Self::Title => "videos.title",
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filters applied to video listing and counting.
#[derive(Debug, Clone, Default)]
pub struct VideoListFilter {
    /// Restrict to a single owner's videos.
    pub owner_id: Option<String>,
    /// Case-insensitive substring match on title or description.
    pub query: Option<String>,
    /// Id of the requesting user, if authenticated. Their own unpublished
    /// videos stay visible.
    pub viewer_id: Option<String>,
    /// Sort key, newest first by default.
    pub sort: VideoSort,
    /// Sort direction.
    pub order: SortOrder,
}

/// Repository for video database operations.
pub struct VideoRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> VideoRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new video record.
    pub async fn create_video(&self, video: CreateVideo) -> Result<Video> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Video>(
            "INSERT INTO videos (id, owner_id, title, description, video_url, thumbnail_url, \
             duration_seconds, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(&video.id)
        .bind(&video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.duration_seconds)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Retrieves a video by its unique identifier, published or not.
    pub async fn get_video_by_id(&self, id: &str) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(video)
    }

    /// Lists videos matching the filter, joined with the uploader's
    /// username and avatar.
    pub async fn list_videos(
        &self,
        filter: &VideoListFilter,
        pagination: &PaginationFilter,
    ) -> Result<Vec<VideoWithOwner>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT videos.*, users.username AS owner_username, \
             users.avatar_url AS owner_avatar_url \
             FROM videos JOIN users ON users.id = videos.owner_id",
        );
        push_filter(&mut builder, filter);
        builder.push(format!(
            " ORDER BY {} {} LIMIT ",
            filter.sort.column(),
            filter.order.keyword()
        ));
        builder.push_bind(pagination.limit());
        builder.push(" OFFSET ");
        builder.push_bind(pagination.offset());

        let videos = builder
            .build_query_as::<VideoWithOwner>()
            .fetch_all(self.pool)
            .await?;

        Ok(videos)
    }

    /// Counts videos matching the filter.
    pub async fn count_videos(&self, filter: &VideoListFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos");
        push_filter(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;

        Ok(count as u64)
    }

    /// Applies a partial update; absent fields keep their stored value.
    pub async fn update_video(&self, id: &str, update: UpdateVideo) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            "UPDATE videos SET \
             title = COALESCE(?, title), \
             description = COALESCE(?, description), \
             thumbnail_url = COALESCE(?, thumbnail_url), \
             updated_at = ? \
             WHERE id = ? \
             RETURNING *",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.thumbnail_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(video)
    }

    /// Deletes a video record. Returns false when it did not exist.
    pub async fn delete_video(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets the publish flag.
    pub async fn set_published(&self, id: &str, is_published: bool) -> Result<()> {
        sqlx::query("UPDATE videos SET is_published = ?, updated_at = ? WHERE id = ?")
            .bind(is_published)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Atomically increments the view counter.
    pub async fn increment_views(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE videos SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &VideoListFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(owner_id) = &filter.owner_id {
        builder.push(" AND owner_id = ");
        builder.push_bind(owner_id.clone());
    }

    if let Some(query) = &filter.query {
        let pattern = format!("%{query}%");
        builder.push(" AND (title LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    match &filter.viewer_id {
        Some(viewer_id) => {
            builder.push(" AND (is_published = 1 OR owner_id = ");
            builder.push_bind(viewer_id.clone());
            builder.push(")");
        }
        None => {
            builder.push(" AND is_published = 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CreateUser;
    use crate::database::test_pool;
    use crate::repositories::user_repository::UserRepository;
    use uuid::Uuid;

    async fn insert_owner(pool: &SqlitePool, username: &str) -> String {
        let repo = UserRepository::new(pool);
        repo.create_user(CreateUser {
            id: Uuid::now_v7().to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: username.to_string(),
            avatar_url: None,
            cover_image_url: None,
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    async fn insert_video(pool: &SqlitePool, owner_id: &str, title: &str) -> Video {
        let repo = VideoRepository::new(pool);
        repo.create_video(CreateVideo {
            id: Uuid::now_v7().to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            description: format!("about {title}"),
            video_url: "https://media.example.com/v.mp4".to_string(),
            thumbnail_url: "https://media.example.com/t.jpg".to_string(),
            duration_seconds: 42.0,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn unpublished_videos_hidden_from_other_viewers() {
        let pool = test_pool().await;
        let owner = insert_owner(&pool, "alice").await;
        let video = insert_video(&pool, &owner, "draft").await;
        let repo = VideoRepository::new(&pool);

        repo.set_published(&video.id, false).await.unwrap();

        let anonymous = repo
            .list_videos(&VideoListFilter::default(), &PaginationFilter::default())
            .await
            .unwrap();
        assert!(anonymous.is_empty());

        let as_owner = repo
            .list_videos(
                &VideoListFilter {
                    viewer_id: Some(owner.clone()),
                    ..Default::default()
                },
                &PaginationFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(as_owner.len(), 1);
    }

    #[tokio::test]
    async fn text_query_matches_title_and_description() {
        let pool = test_pool().await;
        let owner = insert_owner(&pool, "alice").await;
        insert_video(&pool, &owner, "rust tutorial").await;
        insert_video(&pool, &owner, "cooking show").await;
        let repo = VideoRepository::new(&pool);

        let filter = VideoListFilter {
            query: Some("rust".to_string()),
            ..Default::default()
        };
        let found = repo
            .list_videos(&filter, &PaginationFilter::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video.title, "rust tutorial");
        assert_eq!(repo.count_videos(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn listing_sorts_and_carries_owner_details() {
        let pool = test_pool().await;
        let owner = insert_owner(&pool, "alice").await;
        let quiet = insert_video(&pool, &owner, "quiet").await;
        let popular = insert_video(&pool, &owner, "popular").await;
        let repo = VideoRepository::new(&pool);

        repo.increment_views(&popular.id).await.unwrap();

        let by_views = repo
            .list_videos(
                &VideoListFilter {
                    sort: VideoSort::Views,
                    order: SortOrder::Desc,
                    ..Default::default()
                },
                &PaginationFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_views[0].video.id, popular.id);
        assert_eq!(by_views[1].video.id, quiet.id);
        assert_eq!(by_views[0].owner_username, "alice");
        assert!(by_views[0].owner_avatar_url.is_none());

        let by_title = repo
            .list_videos(
                &VideoListFilter {
                    sort: VideoSort::Title,
                    order: SortOrder::Asc,
                    ..Default::default()
                },
                &PaginationFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_title[0].video.title, "popular");
        assert_eq!(by_title[1].video.title, "quiet");
    }

    #[tokio::test]
    async fn pagination_limits_and_counts() {
        let pool = test_pool().await;
        let owner = insert_owner(&pool, "alice").await;
        for i in 0..5 {
            insert_video(&pool, &owner, &format!("video {i}")).await;
        }
        let repo = VideoRepository::new(&pool);

        let page = repo
            .list_videos(
                &VideoListFilter::default(),
                &PaginationFilter {
                    page: Some(2),
                    per_page: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(
            repo.count_videos(&VideoListFilter::default()).await.unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn partial_update_and_views() {
        let pool = test_pool().await;
        let owner = insert_owner(&pool, "alice").await;
        let video = insert_video(&pool, &owner, "original").await;
        let repo = VideoRepository::new(&pool);

        let updated = repo
            .update_video(
                &video.id,
                UpdateVideo {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, video.description);

        repo.increment_views(&video.id).await.unwrap();
        repo.increment_views(&video.id).await.unwrap();
        let stored = repo.get_video_by_id(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 2);
    }
}
