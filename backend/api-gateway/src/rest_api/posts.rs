use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use grpc_jwt_propagation::JwtClientInterceptor;
use serde::Deserialize;
use std::future::Future;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use super::{credentials, optional_user, or_empty, require_user, success, PageQuery, PageResponse};
use crate::clients::proto::friends::{GetFriendsRequest, GetFriendsResponse};
use crate::clients::proto::posts::{
    AddCommentRequest, CreatePostRequest, DeleteCommentRequest, DeletePostRequest,
    GetCommentsRequest, GetPostRequest, GetPostsRequest, LikePostRequest, UnlikePostRequest,
    UpdatePostRequest,
};
use crate::clients::ServiceClients;
use crate::error::ApiResult;

/// Page size used when collecting a viewer's friend ids
const FRIEND_IDS_PAGE_SIZE: i32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub author_id: Option<String>,
    pub group_id: Option<String>,
    pub visibility: Option<String>,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub limit: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostBody {
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
    pub visibility: Option<String>,
    pub group_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub media: Vec<String>,
}

/// Content is replaced; absent visibility and media keep their current value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostBody {
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
    pub visibility: Option<String>,
    #[validate(length(max = 10))]
    pub media: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentBody {
    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,
}

/// Walks every page of a friend list and collects the friend ids
async fn collect_friend_ids<F, Fut>(mut fetch_page: F) -> Result<Vec<Uuid>, tonic::Status>
where
    F: FnMut(i32) -> Fut,
    Fut: Future<Output = Result<GetFriendsResponse, tonic::Status>>,
{
    let mut friend_ids = Vec::new();
    let mut page = 1;
    loop {
        let response = fetch_page(page).await?;
        friend_ids.extend(
            response
                .friends
                .iter()
                .filter_map(|f| Uuid::parse_str(&f.friend_id).ok()),
        );
        if response.friends.is_empty() || page >= response.total_pages {
            return Ok(friend_ids);
        }
        page += 1;
    }
}

/// Credentials for a post read: the bearer plus, for a signed-in caller,
/// their friend ids so friends-only posts resolve. The friend lookup is
/// best-effort; a failure degrades to "no friends".
async fn read_credentials(
    http_req: &HttpRequest,
    clients: &ServiceClients,
) -> ApiResult<JwtClientInterceptor> {
    let auth = credentials(http_req)?;
    let Some(user_id) = optional_user(http_req) else {
        return Ok(auth);
    };

    let friends = collect_friend_ids(|page| {
        let mut client = clients.friends(auth.clone());
        let request = GetFriendsRequest {
            user_id: user_id.to_string(),
            page,
            limit: FRIEND_IDS_PAGE_SIZE,
        };
        async move { client.get_friends(request).await.map(|r| r.into_inner()) }
    })
    .await;

    match friends {
        Ok(friend_ids) => Ok(auth.with_friend_ids(&friend_ids)),
        Err(status) => {
            warn!(user_id = %user_id, error = %status, "Friend lookup failed, reading without friend ids");
            Ok(auth)
        }
    }
}

#[get("/posts")]
pub async fn list_posts(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    query: web::Query<PostsQuery>,
) -> ApiResult<HttpResponse> {
    let auth = read_credentials(&http_req, &clients).await?;
    let query = query.into_inner();

    let response = clients
        .posts(auth)
        .get_posts(GetPostsRequest {
            user_id: optional_user(&http_req).map(|id| id.to_string()).unwrap_or_default(),
            author_id: or_empty(&query.author_id),
            group_id: or_empty(&query.group_id),
            visibility: or_empty(&query.visibility),
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

#[get("/posts/{post_id}")]
pub async fn get_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = read_credentials(&http_req, &clients).await?;

    let post = clients
        .posts(auth)
        .get_post(GetPostRequest {
            post_id: path.into_inner(),
            user_id: optional_user(&http_req).map(|id| id.to_string()).unwrap_or_default(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts")]
pub async fn create_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    body: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;
    let body = body.into_inner();

    let post = clients
        .posts(credentials(&http_req)?)
        .create_post(CreatePostRequest {
            user_id: user_id.to_string(),
            content: body.content,
            visibility: body.visibility.unwrap_or_default(),
            group_id: body.group_id.unwrap_or_default(),
            media: body.media,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{post_id}")]
pub async fn update_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    body: web::Json<UpdatePostBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;
    let body = body.into_inner();

    let post = clients
        .posts(credentials(&http_req)?)
        .update_post(UpdatePostRequest {
            post_id: path.into_inner(),
            user_id: user_id.to_string(),
            content: body.content,
            visibility: body.visibility.unwrap_or_default(),
            update_media: body.media.is_some(),
            media: body.media.unwrap_or_default(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{post_id}")]
pub async fn delete_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    clients
        .posts(credentials(&http_req)?)
        .delete_post(DeletePostRequest {
            post_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?;
    Ok(success())
}

#[get("/posts/{post_id}/comments")]
pub async fn list_comments(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let response = clients
        .posts(credentials(&http_req)?)
        .get_comments(GetCommentsRequest {
            post_id: path.into_inner(),
            page: query.page,
            limit: query.limit,
        })
        .await?
        .into_inner();

    Ok(PageResponse::new(
        response.comments,
        response.total_count,
        response.page,
        response.total_pages,
    )
    .respond())
}

#[post("/posts/{post_id}/comments")]
pub async fn add_comment(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    body: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;

    let comment = clients
        .posts(credentials(&http_req)?)
        .add_comment(AddCommentRequest {
            post_id: path.into_inner(),
            user_id: user_id.to_string(),
            content: body.into_inner().content,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(comment))
}

#[delete("/posts/{post_id}/comments/{comment_id}")]
pub async fn delete_comment(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    let (post_id, comment_id) = path.into_inner();

    clients
        .posts(credentials(&http_req)?)
        .delete_comment(DeleteCommentRequest {
            comment_id,
            post_id,
            user_id: user_id.to_string(),
        })
        .await?;
    Ok(success())
}

#[post("/posts/{post_id}/like")]
pub async fn like_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .posts(credentials(&http_req)?)
        .like_post(LikePostRequest {
            post_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/posts/{post_id}/like")]
pub async fn unlike_post(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let response = clients
        .posts(credentials(&http_req)?)
        .unlike_post(UnlikePostRequest {
            post_id: path.into_inner(),
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::proto::friends::FriendResponse;

    fn friend_page(friend_ids: &[Uuid], page: i32, limit: i32) -> GetFriendsResponse {
        let start = ((page - 1) * limit) as usize;
        let friends = friend_ids
            .iter()
            .skip(start)
            .take(limit as usize)
            .map(|id| FriendResponse {
                friend_id: id.to_string(),
                ..Default::default()
            })
            .collect();
        let total = friend_ids.len() as i32;
        GetFriendsResponse {
            friends,
            total_count: total,
            page,
            total_pages: (total + limit - 1) / limit,
        }
    }

    #[tokio::test]
    async fn test_friend_ids_span_every_page() {
        let all: Vec<Uuid> = (0..250).map(|_| Uuid::new_v4()).collect();
        let mut requested = Vec::new();

        let collected = collect_friend_ids(|page| {
            requested.push(page);
            let response = friend_page(&all, page, FRIEND_IDS_PAGE_SIZE);
            async move { Ok::<_, tonic::Status>(response) }
        })
        .await
        .unwrap();

        assert_eq!(collected, all);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_friends_takes_one_call() {
        let mut calls = 0;

        let collected = collect_friend_ids(|page| {
            calls += 1;
            let response = friend_page(&[], page, FRIEND_IDS_PAGE_SIZE);
            async move { Ok::<_, tonic::Status>(response) }
        })
        .await
        .unwrap();

        assert!(collected.is_empty());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_failed_page_fails_the_lookup() {
        let all: Vec<Uuid> = (0..150).map(|_| Uuid::new_v4()).collect();

        let result = collect_friend_ids(|page| {
            let response = if page == 1 {
                Ok(friend_page(&all, page, FRIEND_IDS_PAGE_SIZE))
            } else {
                Err(tonic::Status::unavailable("friends down"))
            };
            async move { response }
        })
        .await;

        assert_eq!(result.unwrap_err().code(), tonic::Code::Unavailable);
    }
}
