use super::GroupPostRepository;
use crate::domain::{GroupPost, GroupPostComment, GroupPostLike};
use anyhow::Result;
use pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgGroupPostRepository {
    pool: PgPool,
}

impl PgGroupPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GroupPostRepository for PgGroupPostRepository {
    async fn create(&self, group_id: Uuid, author_id: Uuid, content: &str) -> Result<GroupPost> {
        let post = sqlx::query_as::<_, GroupPost>(
            r#"
            INSERT INTO group_posts (id, group_id, author_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn add_media(&self, post_id: Uuid, media_url: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO group_post_media (id, post_id, media_url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(media_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_group(
        &self,
        group_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<GroupPost>, i64)> {
        let posts = sqlx::query_as::<_, GroupPost>(
            r#"
            SELECT id, group_id, author_id, content, created_at, updated_at
            FROM group_posts
            WHERE group_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_by_group(group_id).await?;
        Ok((posts, total))
    }

    async fn count_by_group(&self, group_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_posts WHERE group_id = $1 AND is_deleted = FALSE",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn media(&self, post_id: Uuid) -> Result<Vec<String>> {
        let urls = sqlx::query_scalar::<_, String>(
            r#"
            SELECT media_url FROM group_post_media
            WHERE post_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(urls)
    }

    async fn likes(&self, post_id: Uuid) -> Result<Vec<GroupPostLike>> {
        let likes = sqlx::query_as::<_, GroupPostLike>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM group_post_likes
            WHERE post_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(likes)
    }

    async fn comments(
        &self,
        post_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<GroupPostComment>, i64)> {
        let comments = sqlx::query_as::<_, GroupPostComment>(
            r#"
            SELECT id, post_id, user_id, content, created_at
            FROM group_post_comments
            WHERE post_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_post_comments WHERE post_id = $1 AND is_deleted = FALSE",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((comments, total))
    }
}
