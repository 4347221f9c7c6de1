use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{credentials, optional_user, or_empty, require_user, success, PageQuery, PageResponse};
use crate::clients::proto::groups::{
    CreateGroupPostRequest, CreateGroupRequest, DeleteGroupRequest, GetGroupMembersRequest,
    GetGroupPostsRequest, GetGroupRequest, GetGroupsRequest, JoinGroupRequest, LeaveGroupRequest,
    UpdateGroupRequest,
};
use crate::clients::ServiceClients;
use crate::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct GroupsQuery {
    /// Case-insensitive match on name or description
    pub q: Option<String>,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub limit: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupBody {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// Absent fields keep their current value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupBody {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GroupPostBody {
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub media: Vec<String>,
}

fn caller_or_empty(http_req: &HttpRequest) -> String {
    optional_user(http_req)
        .map(|id| id.to_string())
        .unwrap_or_default()
}

#[get("/groups")]
pub async fn list_groups(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    query: web::Query<GroupsQuery>,
) -> ApiResult<HttpResponse> {
    let response = clients
        .groups(credentials(&http_req)?)
        .get_groups(GetGroupsRequest {
            user_id: caller_or_empty(&http_req),
            query: or_empty(&query.q),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.groups,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[get("/groups/{group_id}")]
pub async fn get_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let group = clients
        .groups(credentials(&http_req)?)
        .get_group(GetGroupRequest {
            group_id: path.into_inner(),
            user_id: caller_or_empty(&http_req),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(group))
}

#[post("/groups")]
pub async fn create_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    body: web::Json<CreateGroupBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;
    let body = body.into_inner();

    let group = clients
        .groups(credentials(&http_req)?)
        .create_group(CreateGroupRequest {
            user_id: user_id.to_string(),
            name: body.name,
            description: body.description.unwrap_or_default(),
            avatar: body.avatar.unwrap_or_default(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(group))
}

#[put("/groups/{group_id}")]
pub async fn update_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    body: web::Json<UpdateGroupBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;

    let group = clients
        .groups(credentials(&http_req)?)
        .update_group(UpdateGroupRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
            name: or_empty(&body.name),
            description: or_empty(&body.description),
            avatar: or_empty(&body.avatar),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(group))
}

#[delete("/groups/{group_id}")]
pub async fn delete_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    clients
        .groups(credentials(&http_req)?)
        .delete_group(DeleteGroupRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?;
    Ok(success())
}

#[post("/groups/{group_id}/members")]
pub async fn join_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .groups(credentials(&http_req)?)
        .join_group(JoinGroupRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/groups/{group_id}/members")]
pub async fn leave_group(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .groups(credentials(&http_req)?)
        .leave_group(LeaveGroupRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[get("/groups/{group_id}/members")]
pub async fn list_members(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let response = clients
        .groups(credentials(&http_req)?)
        .get_group_members(GetGroupMembersRequest {
            group_id: path.into_inner(),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.members,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[get("/groups/{group_id}/posts")]
pub async fn list_group_posts(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .groups(credentials(&http_req)?)
        .get_group_posts(GetGroupPostsRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.posts,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[post("/groups/{group_id}/posts")]
pub async fn create_group_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    body: web::Json<GroupPostBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;
    let body = body.into_inner();

    let post = clients
        .groups(credentials(&http_req)?)
        .create_group_post(CreateGroupPostRequest {
            group_id: path.into_inner(),
            user_id: user_id.to_string(),
            content: body.content,
            media: body.media,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(post))
}
