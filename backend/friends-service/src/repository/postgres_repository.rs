use super::FriendRepository;
use crate::domain::{BlockedUser, FriendRequest, Friendship, RequestStatus};
use anyhow::{Context, Result};
use pagination::Pagination;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL repository for the friend graph
#[derive(Clone)]
pub struct PgFriendRepository {
    pool: PgPool,
}

impl PgFriendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Moves a pending request to `status`; `None` when it is missing or no longer pending
async fn settle_request<'e, E>(
    executor: E,
    request_id: Uuid,
    status: RequestStatus,
) -> Result<Option<FriendRequest>>
where
    E: sqlx::PgExecutor<'e>,
{
    let request = sqlx::query_as::<_, FriendRequest>(
        r#"
        UPDATE friend_requests
        SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'pending' AND is_deleted = FALSE
        RETURNING id, sender_id, receiver_id, status, created_at, updated_at
        "#,
    )
    .bind(request_id)
    .bind(status.as_str())
    .fetch_optional(executor)
    .await
    .with_context(|| format!("Failed to mark friend request {}", status.as_str()))?;

    Ok(request)
}

#[async_trait::async_trait]
impl FriendRepository for PgFriendRepository {
    async fn create_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<Option<FriendRequest>> {
        let request = sqlx::query_as::<_, FriendRequest>(
            r#"
            INSERT INTO friend_requests (id, sender_id, receiver_id, status)
            VALUES ($1, $2, $3, 'pending')
            ON CONFLICT (sender_id, receiver_id) WHERE is_deleted = FALSE DO NOTHING
            RETURNING id, sender_id, receiver_id, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to create friend request")?;

        debug!("Friend request {} -> {} stored", sender_id, receiver_id);
        Ok(request)
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        let request = sqlx::query_as::<_, FriendRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM friend_requests
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get friend request")?;

        Ok(request)
    }

    async fn requests_for_receiver(
        &self,
        receiver_id: Uuid,
        status: Option<RequestStatus>,
        page: Pagination,
    ) -> Result<(Vec<FriendRequest>, i64)> {
        let status = status.map(|s| s.as_str());

        let requests = sqlx::query_as::<_, FriendRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM friend_requests
            WHERE receiver_id = $1 AND is_deleted = FALSE
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(receiver_id)
        .bind(status)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list friend requests")?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM friend_requests
            WHERE receiver_id = $1 AND is_deleted = FALSE
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(receiver_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count friend requests")?;

        Ok((requests, total))
    }

    async fn accept_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        let mut tx = self.pool.begin().await?;

        let request = settle_request(&mut *tx, request_id, RequestStatus::Accepted).await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO friendships (id, user_id, friend_id)
            VALUES ($1, $3, $4), ($2, $4, $3)
            ON CONFLICT (user_id, friend_id) WHERE is_deleted = FALSE DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4())
        .bind(request.sender_id)
        .bind(request.receiver_id)
        .execute(&mut *tx)
        .await
        .context("Failed to create friendship rows")?;

        tx.commit().await?;

        debug!(
            "Friendship created: {} <-> {}",
            request.sender_id, request.receiver_id
        );
        Ok(Some(request))
    }

    async fn reject_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        settle_request(&self.pool, request_id, RequestStatus::Rejected).await
    }

    async fn pending_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<FriendRequest>> {
        let request = sqlx::query_as::<_, FriendRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM friend_requests
            WHERE is_deleted = FALSE AND status = 'pending'
              AND ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up pending friend request")?;

        Ok(request)
    }

    async fn are_friends(&self, user_id: Uuid, friend_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM friendships
                WHERE user_id = $1 AND friend_id = $2 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check friendship")?;

        Ok(exists)
    }

    async fn friends_of(&self, user_id: Uuid, page: Pagination) -> Result<(Vec<Friendship>, i64)> {
        let friendships = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT id, user_id, friend_id, created_at
            FROM friendships
            WHERE user_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list friends")?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM friendships WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count friends")?;

        Ok((friendships, total))
    }

    async fn remove_friendship(&self, user_a: Uuid, user_b: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            UPDATE friendships
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE is_deleted = FALSE
              AND ((user_id = $1 AND friend_id = $2)
                OR (user_id = $2 AND friend_id = $1))
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *tx)
        .await
        .context("Failed to remove friendship rows")?;

        if removed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE friend_requests
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE is_deleted = FALSE AND status = 'accepted'
              AND ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *tx)
        .await
        .context("Failed to retire accepted friend request")?;

        tx.commit().await?;

        debug!("Friendship removed: {} <-> {}", user_a, user_b);
        Ok(true)
    }

    async fn block(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<Option<BlockedUser>> {
        let blocked = sqlx::query_as::<_, BlockedUser>(
            r#"
            INSERT INTO blocked_users (id, user_id, blocked_user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, blocked_user_id) WHERE is_deleted = FALSE DO NOTHING
            RETURNING id, user_id, blocked_user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(blocked_user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to block user")?;

        debug!("Block stored: {} -> {}", user_id, blocked_user_id);
        Ok(blocked)
    }

    async fn unblock(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE blocked_users
            SET is_deleted = TRUE, deleted_at = NOW()
            WHERE user_id = $1 AND blocked_user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .bind(blocked_user_id)
        .execute(&self.pool)
        .await
        .context("Failed to unblock user")?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_blocked(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocked_users
                WHERE user_id = $1 AND blocked_user_id = $2 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(user_id)
        .bind(blocked_user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check block")?;

        Ok(exists)
    }

    async fn blocked_by(&self, user_id: Uuid, page: Pagination) -> Result<(Vec<BlockedUser>, i64)> {
        let blocked = sqlx::query_as::<_, BlockedUser>(
            r#"
            SELECT id, user_id, blocked_user_id, created_at
            FROM blocked_users
            WHERE user_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list blocked users")?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM blocked_users WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count blocked users")?;

        Ok((blocked, total))
    }
}
