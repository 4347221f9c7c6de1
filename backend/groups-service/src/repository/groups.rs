use super::GroupRepository;
use crate::domain::{Group, GroupChanges, NewGroup};
use anyhow::Result;
use pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so the query is matched literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait::async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, group: NewGroup) -> Result<Group> {
        let created = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (id, name, description, avatar, creator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, avatar, creator_id, is_deleted,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.avatar)
        .bind(group.creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, description, avatar, creator_id, is_deleted,
                   created_at, updated_at, deleted_at
            FROM groups
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn search(&self, query: &str, page: Pagination) -> Result<(Vec<Group>, i64)> {
        let pattern = like_pattern(query);

        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, description, avatar, creator_id, is_deleted,
                   created_at, updated_at, deleted_at
            FROM groups
            WHERE is_deleted = FALSE AND name ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM groups WHERE is_deleted = FALSE AND name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((groups, total))
    }

    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                avatar = COALESCE($4, avatar),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, name, description, avatar, creator_id, is_deleted,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.avatar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE groups
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
