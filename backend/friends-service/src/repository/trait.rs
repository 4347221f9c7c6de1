use crate::domain::{BlockedUser, FriendRequest, Friendship, RequestStatus};
use anyhow::Result;
use pagination::Pagination;
use uuid::Uuid;

/// Storage for friend requests, friendships and blocks.
/// Every read ignores tombstoned rows.
#[async_trait::async_trait]
pub trait FriendRepository: Send + Sync {
    /// Create a pending request.
    /// Returns `None` if a live request from sender to receiver already exists.
    async fn create_request(&self, sender_id: Uuid, receiver_id: Uuid)
        -> Result<Option<FriendRequest>>;

    async fn find_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>>;

    /// Requests received by a user, newest first
    async fn requests_for_receiver(
        &self,
        receiver_id: Uuid,
        status: Option<RequestStatus>,
        page: Pagination,
    ) -> Result<(Vec<FriendRequest>, i64)>;

    /// Mark a pending request accepted and create both friendship rows.
    /// Returns `None` if the request is no longer pending.
    async fn accept_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>>;

    /// Returns `None` if the request is no longer pending
    async fn reject_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>>;

    /// A pending request in either direction
    async fn pending_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<FriendRequest>>;

    async fn are_friends(&self, user_id: Uuid, friend_id: Uuid) -> Result<bool>;

    /// Friendship rows owned by `user_id`, newest first
    async fn friends_of(&self, user_id: Uuid, page: Pagination) -> Result<(Vec<Friendship>, i64)>;

    /// Tombstone both friendship rows and the accepted request between the
    /// pair. Returns false if they were not friends.
    async fn remove_friendship(&self, user_a: Uuid, user_b: Uuid) -> Result<bool>;

    /// Returns `None` if the block already exists
    async fn block(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<Option<BlockedUser>>;

    async fn unblock(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool>;

    async fn is_blocked(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool>;

    /// True if either user has blocked the other
    async fn is_blocked_between(&self, user_a: Uuid, user_b: Uuid) -> Result<bool> {
        Ok(self.is_blocked(user_a, user_b).await? || self.is_blocked(user_b, user_a).await?)
    }

    /// Users blocked by `user_id`, newest first
    async fn blocked_by(&self, user_id: Uuid, page: Pagination)
        -> Result<(Vec<BlockedUser>, i64)>;
}
