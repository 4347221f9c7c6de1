use crate::domain::{BlockedUser, FriendRequest, Friendship, FriendshipStatus, RequestStatus};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::FriendRepository;
use pagination::{Page, Pagination};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Friend request state machine, friendships and blocks
#[derive(Clone)]
pub struct FriendService {
    repo: Arc<dyn FriendRepository>,
}

fn storage(message: &'static str) -> impl FnOnce(anyhow::Error) -> ServiceError {
    move |e| ServiceError::storage(message, e)
}

impl FriendService {
    pub fn new(repo: Arc<dyn FriendRepository>) -> Self {
        Self { repo }
    }

    /// Classify the pair: self, friends, pending (either direction), blocked
    /// (either direction), otherwise none.
    pub async fn check_friendship(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> ServiceResult<FriendshipStatus> {
        if user_id == other_id {
            return Ok(FriendshipStatus::Myself);
        }

        if self
            .repo
            .are_friends(user_id, other_id)
            .await
            .map_err(storage("failed to check friendship"))?
        {
            return Ok(FriendshipStatus::Friends);
        }

        if let Some(request) = self
            .repo
            .pending_between(user_id, other_id)
            .await
            .map_err(storage("failed to check friendship"))?
        {
            return Ok(FriendshipStatus::Pending {
                request_id: request.id,
            });
        }

        if self
            .repo
            .is_blocked_between(user_id, other_id)
            .await
            .map_err(storage("failed to check friendship"))?
        {
            return Ok(FriendshipStatus::Blocked);
        }

        Ok(FriendshipStatus::Unrelated)
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ServiceResult<FriendRequest> {
        if sender_id == receiver_id {
            return Err(ServiceError::InvalidInput(
                "cannot send friend request to yourself".into(),
            ));
        }

        match self.check_friendship(sender_id, receiver_id).await? {
            FriendshipStatus::Friends => {
                return Err(ServiceError::AlreadyExists("already friends".into()));
            }
            FriendshipStatus::Pending { .. } => {
                return Err(ServiceError::AlreadyExists(
                    "friend request already sent".into(),
                ));
            }
            FriendshipStatus::Blocked => {
                return Err(ServiceError::PermissionDenied(
                    "cannot send friend request to blocked user".into(),
                ));
            }
            FriendshipStatus::Myself | FriendshipStatus::Unrelated => {}
        }

        // A rejected request still occupies the (sender, receiver) slot
        let request = self
            .repo
            .create_request(sender_id, receiver_id)
            .await
            .map_err(storage("failed to create friend request"))?
            .ok_or_else(|| ServiceError::AlreadyExists("friend request already sent".into()))?;

        info!(request_id = %request.id, sender_id = %sender_id, receiver_id = %receiver_id, "Friend request sent");
        Ok(request)
    }

    pub async fn get_friend_requests(
        &self,
        receiver_id: Uuid,
        status: &str,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<FriendRequest>> {
        let status = if status.is_empty() {
            None
        } else {
            Some(
                status
                    .parse::<RequestStatus>()
                    .map_err(|_| ServiceError::InvalidInput("invalid status".into()))?,
            )
        };

        let page = Pagination::new(page, limit);
        let (requests, total_count) = self
            .repo
            .requests_for_receiver(receiver_id, status, page)
            .await
            .map_err(storage("failed to get friend requests"))?;

        Ok(page.page_of(requests, total_count))
    }

    /// Only the receiver may settle a request, and only while it is pending
    async fn pending_request_for(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        action: &str,
    ) -> ServiceResult<FriendRequest> {
        let request = self
            .repo
            .find_request(request_id)
            .await
            .map_err(storage("failed to get friend request"))?
            .ok_or_else(|| ServiceError::NotFound("friend request not found".into()))?;

        if request.receiver_id != user_id {
            return Err(ServiceError::PermissionDenied(format!(
                "not authorized to {} this friend request",
                action
            )));
        }
        if !request.is_pending() {
            return Err(not_pending());
        }
        Ok(request)
    }

    pub async fn accept_friend_request(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<FriendRequest> {
        self.pending_request_for(request_id, user_id, "accept")
            .await?;

        let request = self
            .repo
            .accept_request(request_id)
            .await
            .map_err(storage("failed to accept friend request"))?
            .ok_or_else(not_pending)?;

        info!(request_id = %request_id, "Friend request accepted");
        Ok(request)
    }

    pub async fn reject_friend_request(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<FriendRequest> {
        self.pending_request_for(request_id, user_id, "reject")
            .await?;

        let request = self
            .repo
            .reject_request(request_id)
            .await
            .map_err(storage("failed to reject friend request"))?
            .ok_or_else(not_pending)?;

        info!(request_id = %request_id, "Friend request rejected");
        Ok(request)
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<Friendship>> {
        let page = Pagination::new(page, limit);
        let (friends, total_count) = self
            .repo
            .friends_of(user_id, page)
            .await
            .map_err(storage("failed to get friends"))?;

        Ok(page.page_of(friends, total_count))
    }

    pub async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> ServiceResult<()> {
        let removed = self
            .repo
            .remove_friendship(user_id, friend_id)
            .await
            .map_err(storage("failed to remove friend"))?;
        if !removed {
            return Err(ServiceError::NotFound("not friends".into()));
        }

        info!(user_id = %user_id, friend_id = %friend_id, "Friend removed");
        Ok(())
    }

    /// Blocking ends any existing friendship first
    pub async fn block_user(&self, user_id: Uuid, blocked_user_id: Uuid) -> ServiceResult<()> {
        if user_id == blocked_user_id {
            return Err(ServiceError::InvalidInput("cannot block yourself".into()));
        }

        if self
            .repo
            .is_blocked(user_id, blocked_user_id)
            .await
            .map_err(storage("failed to check block"))?
        {
            return Err(ServiceError::AlreadyExists("user is already blocked".into()));
        }

        self.repo
            .remove_friendship(user_id, blocked_user_id)
            .await
            .map_err(storage("failed to remove friend"))?;

        self.repo
            .block(user_id, blocked_user_id)
            .await
            .map_err(storage("failed to block user"))?
            .ok_or_else(|| ServiceError::AlreadyExists("user is already blocked".into()))?;

        info!(user_id = %user_id, blocked_user_id = %blocked_user_id, "User blocked");
        Ok(())
    }

    pub async fn unblock_user(&self, user_id: Uuid, blocked_user_id: Uuid) -> ServiceResult<()> {
        let removed = self
            .repo
            .unblock(user_id, blocked_user_id)
            .await
            .map_err(storage("failed to unblock user"))?;
        if !removed {
            return Err(ServiceError::NotFound("user is not blocked".into()));
        }

        info!(user_id = %user_id, blocked_user_id = %blocked_user_id, "User unblocked");
        Ok(())
    }

    pub async fn get_blocked_users(
        &self,
        user_id: Uuid,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<BlockedUser>> {
        let page = Pagination::new(page, limit);
        let (blocked, total_count) = self
            .repo
            .blocked_by(user_id, page)
            .await
            .map_err(storage("failed to get blocked users"))?;

        Ok(page.page_of(blocked, total_count))
    }
}

fn not_pending() -> ServiceError {
    ServiceError::FailedPrecondition("friend request is not pending".into())
}
