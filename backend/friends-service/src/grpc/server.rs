use super::friends::friend_service_server::FriendService as FriendServiceRpc;
use super::friends::*;
use crate::domain::{BlockedUser, FriendRequest, Friendship};
use crate::services::FriendService;
use grpc_jwt_propagation::AccessPolicy;
use pagination::Page;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

/// gRPC handlers for the friend graph; every method needs a bearer token
pub struct FriendServiceImpl {
    service: Arc<FriendService>,
    policy: AccessPolicy,
}

impl FriendServiceImpl {
    pub fn new(service: Arc<FriendService>) -> Self {
        Self {
            service,
            policy: AccessPolicy::default(),
        }
    }
}

#[allow(clippy::result_large_err)]
fn parse_uuid(value: &str, field: &str) -> Result<Uuid, Status> {
    if value.is_empty() {
        return Err(Status::invalid_argument(format!("{} is required", field)));
    }
    Uuid::parse_str(value).map_err(|_| Status::invalid_argument(format!("invalid {}", field)))
}

fn count_to_i32(count: i64) -> i32 {
    i32::try_from(count.max(0)).unwrap_or(i32::MAX)
}

fn page_totals<T>(page: &Page<T>) -> (i32, i32, i32) {
    (count_to_i32(page.total_count), page.page, page.total_pages)
}

fn request_to_response(request: &FriendRequest) -> FriendRequestResponse {
    FriendRequestResponse {
        request_id: request.id.to_string(),
        sender_id: request.sender_id.to_string(),
        receiver_id: request.receiver_id.to_string(),
        status: request.status.clone(),
        created_at: request.created_at.to_rfc3339(),
        updated_at: request.updated_at.to_rfc3339(),
    }
}

fn friendship_to_response(friendship: &Friendship) -> FriendResponse {
    FriendResponse {
        user_id: friendship.user_id.to_string(),
        friend_id: friendship.friend_id.to_string(),
        friends_since: friendship.created_at.to_rfc3339(),
    }
}

fn blocked_to_response(blocked: &BlockedUser) -> BlockedUserResponse {
    BlockedUserResponse {
        user_id: blocked.user_id.to_string(),
        blocked_user_id: blocked.blocked_user_id.to_string(),
        blocked_at: blocked.created_at.to_rfc3339(),
    }
}

#[tonic::async_trait]
impl FriendServiceRpc for FriendServiceImpl {
    async fn send_friend_request(
        &self,
        request: Request<SendFriendRequestRequest>,
    ) -> Result<Response<FriendRequestResponse>, Status> {
        let caller = self.policy.authorize(&request, "SendFriendRequest")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let friend_id = parse_uuid(&req.friend_id, "friend ID")?;

        info!(user_id = %user_id, friend_id = %friend_id, "SendFriendRequest request received");

        let created = self
            .service
            .send_friend_request(user_id, friend_id)
            .await?;

        Ok(Response::new(request_to_response(&created)))
    }

    async fn get_friend_requests(
        &self,
        request: Request<GetFriendRequestsRequest>,
    ) -> Result<Response<GetFriendRequestsResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetFriendRequests")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;

        let page = self
            .service
            .get_friend_requests(user_id, &req.status, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetFriendRequestsResponse {
            requests: page.items.iter().map(request_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn accept_friend_request(
        &self,
        request: Request<RespondFriendRequestRequest>,
    ) -> Result<Response<FriendRequestResponse>, Status> {
        let caller = self.policy.authorize(&request, "AcceptFriendRequest")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let request_id = parse_uuid(&req.request_id, "request ID")?;

        let accepted = self
            .service
            .accept_friend_request(request_id, user_id)
            .await?;

        Ok(Response::new(request_to_response(&accepted)))
    }

    async fn reject_friend_request(
        &self,
        request: Request<RespondFriendRequestRequest>,
    ) -> Result<Response<FriendRequestResponse>, Status> {
        let caller = self.policy.authorize(&request, "RejectFriendRequest")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let request_id = parse_uuid(&req.request_id, "request ID")?;

        let rejected = self
            .service
            .reject_friend_request(request_id, user_id)
            .await?;

        Ok(Response::new(request_to_response(&rejected)))
    }

    async fn get_friends(
        &self,
        request: Request<GetFriendsRequest>,
    ) -> Result<Response<GetFriendsResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetFriends")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;

        let page = self
            .service
            .get_friends(user_id, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetFriendsResponse {
            friends: page.items.iter().map(friendship_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn remove_friend(
        &self,
        request: Request<RemoveFriendRequest>,
    ) -> Result<Response<SuccessResponse>, Status> {
        let caller = self.policy.authorize(&request, "RemoveFriend")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let friend_id = parse_uuid(&req.friend_id, "friend ID")?;

        self.service.remove_friend(user_id, friend_id).await?;

        Ok(Response::new(SuccessResponse { success: true }))
    }

    async fn block_user(
        &self,
        request: Request<BlockUserRequest>,
    ) -> Result<Response<SuccessResponse>, Status> {
        let caller = self.policy.authorize(&request, "BlockUser")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let blocked_user_id = parse_uuid(&req.blocked_user_id, "blocked user ID")?;

        self.service.block_user(user_id, blocked_user_id).await?;

        Ok(Response::new(SuccessResponse { success: true }))
    }

    async fn unblock_user(
        &self,
        request: Request<BlockUserRequest>,
    ) -> Result<Response<SuccessResponse>, Status> {
        let caller = self.policy.authorize(&request, "UnblockUser")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let blocked_user_id = parse_uuid(&req.blocked_user_id, "blocked user ID")?;

        self.service.unblock_user(user_id, blocked_user_id).await?;

        Ok(Response::new(SuccessResponse { success: true }))
    }

    async fn get_blocked_users(
        &self,
        request: Request<GetBlockedUsersRequest>,
    ) -> Result<Response<GetBlockedUsersResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetBlockedUsers")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;

        let page = self
            .service
            .get_blocked_users(user_id, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetBlockedUsersResponse {
            blocked_users: page.items.iter().map(blocked_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn check_friendship(
        &self,
        request: Request<CheckFriendshipRequest>,
    ) -> Result<Response<CheckFriendshipResponse>, Status> {
        let caller = self.policy.authorize(&request, "CheckFriendship")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let friend_id = parse_uuid(&req.friend_id, "friend ID")?;

        let status = self.service.check_friendship(user_id, friend_id).await?;

        Ok(Response::new(CheckFriendshipResponse {
            status: status.as_str().to_string(),
            request_id: status
                .request_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }))
    }
}
