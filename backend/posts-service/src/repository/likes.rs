use super::LikeRepository;
use crate::domain::Like;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL repository for likes
///
/// Uniqueness of live likes is enforced by the partial index
/// `likes_post_user_live_idx`.
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LikeRepository for PgLikeRepository {
    async fn create(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (id, post_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) WHERE is_deleted = FALSE DO NOTHING
            RETURNING id, post_id, user_id, is_deleted, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(like)
    }

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, post_id, user_id, is_deleted, created_at
            FROM likes
            WHERE post_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(like)
    }

    async fn soft_delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE likes
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE post_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE post_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
