use super::CommentRepository;
use crate::domain::{Comment, NewComment};
use anyhow::Result;
use pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL repository for comments
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, author_name, author_avatar, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, post_id, author_id, author_name, author_avatar, content,
                      is_deleted, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.author_name)
        .bind(&comment.author_avatar)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, author_name, author_avatar, content,
                   is_deleted, created_at, updated_at
            FROM comments
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_by_post(&self, post_id: Uuid, page: Pagination) -> Result<(Vec<Comment>, i64)> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, author_name, author_avatar, content,
                   is_deleted, created_at, updated_at
            FROM comments
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
            r#"
            SELECT COUNT(*) FROM comments
            WHERE post_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((comments, total))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
