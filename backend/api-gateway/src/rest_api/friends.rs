use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{credentials, or_empty, require_user, success, PageQuery, PageResponse};
use crate::clients::proto::friends::{
    BlockUserRequest, CheckFriendshipRequest, GetBlockedUsersRequest, GetFriendRequestsRequest,
    GetFriendsRequest, RemoveFriendRequest, RespondFriendRequestRequest, SendFriendRequestRequest,
};
use crate::clients::ServiceClients;
use crate::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct RequestsQuery {
    /// pending, accepted or rejected; absent means any
    pub status: Option<String>,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub limit: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[validate(length(min = 1, message = "friend_id is required"))]
    pub friend_id: String,
}

#[get("/friends")]
pub async fn list_friends(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .friends(credentials(&http_req)?)
        .get_friends(GetFriendsRequest {
            user_id: user_id.to_string(),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.friends,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[get("/friends/requests")]
pub async fn list_requests(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    query: web::Query<RequestsQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .friends(credentials(&http_req)?)
        .get_friend_requests(GetFriendRequestsRequest {
            user_id: user_id.to_string(),
            status: or_empty(&query.status),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.requests,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[post("/friends/requests")]
pub async fn send_request(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    body: web::Json<FriendRequestBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;

    let request = clients
        .friends(credentials(&http_req)?)
        .send_friend_request(SendFriendRequestRequest {
            user_id: user_id.to_string(),
            friend_id: body.into_inner().friend_id,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(request))
}

#[put("/friends/requests/{request_id}/accept")]
pub async fn accept_request(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let request = clients
        .friends(credentials(&http_req)?)
        .accept_friend_request(RespondFriendRequestRequest {
            request_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(request))
}

#[put("/friends/requests/{request_id}/reject")]
pub async fn reject_request(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let request = clients
        .friends(credentials(&http_req)?)
        .reject_friend_request(RespondFriendRequestRequest {
            request_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(request))
}

#[delete("/friends/{friend_id}")]
pub async fn remove_friend(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    clients
        .friends(credentials(&http_req)?)
        .remove_friend(RemoveFriendRequest {
            user_id: user_id.to_string(),
            friend_id: path.into_inner(),
        })
        .await?;
    Ok(success())
}

#[post("/friends/block/{blocked_user_id}")]
pub async fn block_user(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    clients
        .friends(credentials(&http_req)?)
        .block_user(BlockUserRequest {
            user_id: user_id.to_string(),
            blocked_user_id: path.into_inner(),
        })
        .await?;
    Ok(success())
}

#[delete("/friends/block/{blocked_user_id}")]
pub async fn unblock_user(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    clients
        .friends(credentials(&http_req)?)
        .unblock_user(BlockUserRequest {
            user_id: user_id.to_string(),
            blocked_user_id: path.into_inner(),
        })
        .await?;
    Ok(success())
}

#[get("/friends/blocked")]
pub async fn list_blocked(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .friends(credentials(&http_req)?)
        .get_blocked_users(GetBlockedUsersRequest {
            user_id: user_id.to_string(),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.blocked_users,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[get("/friends/status/{other_id}")]
pub async fn friendship_status(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let status = clients
        .friends(credentials(&http_req)?)
        .check_friendship(CheckFriendshipRequest {
            user_id: user_id.to_string(),
            friend_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(status))
}
