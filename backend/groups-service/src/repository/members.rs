use super::MemberRepository;
use crate::domain::{GroupMember, MemberRole};
use anyhow::Result;
use pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

/// Live memberships are unique per (group, user) through
/// `group_members_live_idx`.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MemberRepository for PgMemberRepository {
    async fn add(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<GroupMember>> {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            INSERT INTO group_members (id, group_id, user_id, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_id, user_id) WHERE is_deleted = FALSE DO NOTHING
            RETURNING id, group_id, user_id, role, joined_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>> {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT id, group_id, user_id, role, joined_at
            FROM group_members
            WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE group_members
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE group_id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<GroupMember>, i64)> {
        let members = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT id, group_id, user_id, role, joined_at
            FROM group_members
            WHERE group_id = $1 AND is_deleted = FALSE
            ORDER BY joined_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count(group_id).await?;
        Ok((members, total))
    }

    async fn count(&self, group_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_members WHERE group_id = $1 AND is_deleted = FALSE",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
