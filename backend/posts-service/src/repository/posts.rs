use super::PostRepository;
use crate::domain::{NewPost, Post, PostChanges};
use anyhow::Result;
use pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

const POST_COLUMNS: &str = "id, author_id, author_name, author_avatar, content, visibility, \
     group_id, group_name, media, likes_count, comments_count, is_deleted, \
     created_at, updated_at, deleted_at";

/// PostgreSQL repository for posts
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Shared page + count query for the listing methods.
    ///
    /// `filter` is a trusted SQL fragment; `$1` is `bind_a` and `$2` is `bind_b`.
    async fn page_where(
        &self,
        filter: &str,
        page: Pagination,
        bind_a: Option<Uuid>,
        bind_b: Option<Vec<Uuid>>,
    ) -> Result<(Vec<Post>, i64)> {
        let bound = usize::from(bind_a.is_some()) + usize::from(bind_b.is_some());
        let list_sql = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE is_deleted = FALSE AND ({filter}) \
             ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bound + 1,
            bound + 2
        );
        let count_sql =
            format!("SELECT COUNT(*) FROM posts WHERE is_deleted = FALSE AND ({filter})");

        let mut list = sqlx::query_as::<_, Post>(&list_sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);

        if let Some(a) = bind_a {
            list = list.bind(a);
            count = count.bind(a);
        }
        if let Some(b) = bind_b {
            list = list.bind(b.clone());
            count = count.bind(b);
        }

        let posts = list
            .bind(i64::from(page.limit()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        let total = count.fetch_one(&self.pool).await?;

        Ok((posts, total))
    }
}

#[async_trait::async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let sql = format!(
            "INSERT INTO posts (id, author_id, author_name, author_avatar, content, visibility, \
             group_id, group_name, media) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {POST_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(post.author_id)
            .bind(&post.author_name)
            .bind(&post.author_avatar)
            .bind(&post.content)
            .bind(post.visibility.as_str())
            .bind(post.group_id)
            .bind(&post.group_name)
            .bind(&post.media)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND is_deleted = FALSE");

        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn find_by_author(&self, author_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)> {
        self.page_where("author_id = $1", page, Some(author_id), None)
            .await
    }

    async fn find_by_group(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)> {
        self.page_where("group_id = $1", page, Some(group_id), None)
            .await
    }

    async fn find_public(&self, page: Pagination) -> Result<(Vec<Post>, i64)> {
        self.page_where("visibility = 'public'", page, None, None)
            .await
    }

    async fn find_visible(
        &self,
        viewer_id: Uuid,
        friend_ids: &[Uuid],
        page: Pagination,
    ) -> Result<(Vec<Post>, i64)> {
        self.page_where(
            "visibility = 'public' OR author_id = $1 \
             OR (visibility = 'private' AND author_id = ANY($2))",
            page,
            Some(viewer_id),
            Some(friend_ids.to_vec()),
        )
        .await
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET \
                content = $2, \
                visibility = COALESCE($3, visibility), \
                media = COALESCE($4, media), \
                updated_at = NOW() \
             WHERE id = $1 AND is_deleted = FALSE \
             RETURNING {POST_COLUMNS}"
        );

        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&changes.content)
            .bind(changes.visibility.map(|v| v.as_str()))
            .bind(changes.media)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE post_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE likes
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE post_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn adjust_likes_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE posts
            SET likes_count = GREATEST(likes_count + $2, 0)
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING likes_count
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    async fn adjust_comments_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE posts
            SET comments_count = GREATEST(comments_count + $2, 0)
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING comments_count
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }
}
