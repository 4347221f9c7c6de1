/// REST API v1
///
/// Translates HTTP requests into gRPC calls on the backend services:
/// ```text
/// Client (HTTP REST)
///     ↓
/// JwtAuth middleware (optional bearer token)
///     ↓
/// REST handler (this module)
///     ↓
/// gRPC client → users / posts / groups / friends
/// ```
pub mod auth;
pub mod friends;
pub mod groups;
pub mod posts;
pub mod users;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthenticatedUser, BearerToken, CredentialRejection};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use grpc_jwt_propagation::JwtClientInterceptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Register every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api/v1")
            .service(auth::google_login)
            .service(auth::google_callback)
            .service(auth::microsoft_login)
            .service(auth::microsoft_callback)
            .service(auth::signout)
            .service(users::register)
            .service(users::login)
            .service(users::get_me)
            .service(users::update_me)
            .service(posts::list_posts)
            .service(posts::create_post)
            .service(posts::get_post)
            .service(posts::update_post)
            .service(posts::delete_post)
            .service(posts::list_comments)
            .service(posts::add_comment)
            .service(posts::delete_comment)
            .service(posts::like_post)
            .service(posts::unlike_post)
            .service(friends::list_friends)
            .service(friends::list_requests)
            .service(friends::send_request)
            .service(friends::accept_request)
            .service(friends::reject_request)
            .service(friends::block_user)
            .service(friends::unblock_user)
            .service(friends::list_blocked)
            .service(friends::friendship_status)
            .service(friends::remove_friend)
            .service(groups::list_groups)
            .service(groups::create_group)
            .service(groups::get_group)
            .service(groups::update_group)
            .service(groups::delete_group)
            .service(groups::join_group)
            .service(groups::leave_group)
            .service(groups::list_members)
            .service(groups::list_group_posts)
            .service(groups::create_group_post),
    );
}

/// `page`/`limit` query parameters; zero lets the service pick its defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub limit: i32,
}

/// Body of every list response
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total_count: i32,
    pub page: i32,
    pub total_pages: i32,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(items: Vec<T>, total_count: i32, page: i32, total_pages: i32) -> Self {
        Self {
            items,
            total_count,
            page,
            total_pages,
        }
    }

    pub fn respond(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

/// Caller id, or 401 carrying the token's rejection reason when one was recorded
pub(crate) fn require_user(req: &HttpRequest) -> ApiResult<Uuid> {
    let extensions = req.extensions();
    if let Some(AuthenticatedUser(id)) = extensions.get::<AuthenticatedUser>() {
        return Ok(*id);
    }
    match extensions.get::<CredentialRejection>() {
        Some(CredentialRejection(reason)) => Err(ApiError::Unauthorized(reason.to_string())),
        None => Err(ApiError::unauthenticated()),
    }
}

pub(crate) fn optional_user(req: &HttpRequest) -> Option<Uuid> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .map(|AuthenticatedUser(id)| *id)
}

/// Forward the caller's token, or nothing for an anonymous request. A rejected
/// token never reaches the extensions, so it is not forwarded.
pub(crate) fn credentials(req: &HttpRequest) -> ApiResult<JwtClientInterceptor> {
    match req.extensions().get::<BearerToken>() {
        Some(BearerToken(token)) => Ok(JwtClientInterceptor::new(token)?),
        None => Ok(JwtClientInterceptor::anonymous()),
    }
}

pub(crate) fn success() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

/// Empty string for an absent optional field, which the services read as "unset"
pub(crate) fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
