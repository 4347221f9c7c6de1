use super::posts::post_service_server::PostService as PostServiceRpc;
use super::posts::*;
use crate::domain::{Comment, Post, PostView};
use crate::services::{PostQuery, PostService};
use grpc_jwt_propagation::{AccessPolicy, Caller, JwtClaimsExt};
use pagination::Page;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

/// Methods callable without a bearer token
pub const PUBLIC_METHODS: &[&str] = &["GetPost", "GetPosts", "GetComments"];

pub struct PostServiceImpl {
    service: Arc<PostService>,
    policy: AccessPolicy,
}

impl PostServiceImpl {
    pub fn new(service: Arc<PostService>) -> Self {
        Self {
            service,
            policy: AccessPolicy::new(PUBLIC_METHODS),
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

#[allow(clippy::result_large_err)]
fn parse_optional_uuid(value: &str, field: &str) -> Result<Option<Uuid>, Status> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_uuid(value, field).map(Some)
}

/// Viewer for public reads: the verified caller, never a bare body id
#[allow(clippy::result_large_err)]
fn viewer(caller: Caller, body_user_id: &str) -> Result<Option<Uuid>, Status> {
    match caller {
        Caller::Anonymous => Ok(None),
        Caller::User(_) => caller.acting_as(body_user_id).map(Some),
    }
}

fn count_to_i32(count: i64) -> i32 {
    i32::try_from(count.max(0)).unwrap_or(i32::MAX)
}

fn post_to_response(post: &Post, is_liked: bool) -> PostResponse {
    PostResponse {
        post_id: post.id.to_string(),
        author_id: post.author_id.to_string(),
        author_name: post.author_name.clone(),
        author_avatar: post.author_avatar.clone(),
        content: post.content.clone(),
        visibility: post.visibility.clone(),
        group_id: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        group_name: post.group_name.clone().unwrap_or_default(),
        media: post.media.clone(),
        likes_count: count_to_i32(post.likes_count),
        comments_count: count_to_i32(post.comments_count),
        is_liked,
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

fn view_to_response(view: &PostView) -> PostResponse {
    post_to_response(&view.post, view.is_liked)
}

fn comment_to_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        comment_id: comment.id.to_string(),
        post_id: comment.post_id.to_string(),
        author_id: comment.author_id.to_string(),
        author_name: comment.author_name.clone(),
        author_avatar: comment.author_avatar.clone(),
        content: comment.content.clone(),
        created_at: comment.created_at.to_rfc3339(),
        updated_at: comment.updated_at.to_rfc3339(),
    }
}

fn page_totals<T>(page: &Page<T>) -> (i32, i32, i32) {
    (count_to_i32(page.total_count), page.page, page.total_pages)
}

#[tonic::async_trait]
impl PostServiceRpc for PostServiceImpl {
    async fn create_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<PostResponse>, Status> {
        let caller = self.policy.authorize(&request, "CreatePost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_optional_uuid(&req.group_id, "group ID")?;

        info!(user_id = %user_id, visibility = %req.visibility, "CreatePost request received");

        let post = self
            .service
            .create_post(user_id, &req.content, &req.visibility, group_id, req.media)
            .await?;

        Ok(Response::new(post_to_response(&post, false)))
    }

    async fn get_post(
        &self,
        request: Request<GetPostRequest>,
    ) -> Result<Response<PostResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetPost")?;
        let friend_ids = request.friend_ids().to_vec();
        let req = request.into_inner();
        let post_id = parse_uuid(&req.post_id, "post ID")?;
        let viewer_id = viewer(caller, &req.user_id)?;

        let view = self
            .service
            .get_post(post_id, viewer_id, &friend_ids)
            .await?;

        Ok(Response::new(view_to_response(&view)))
    }

    async fn get_posts(
        &self,
        request: Request<GetPostsRequest>,
    ) -> Result<Response<GetPostsResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetPosts")?;
        let friend_ids = request.friend_ids().to_vec();
        let req = request.into_inner();

        let viewer_id = viewer(caller, &req.user_id)?;
        let query = PostQuery {
            viewer_id,
            author_id: parse_optional_uuid(&req.author_id, "author ID")?,
            group_id: parse_optional_uuid(&req.group_id, "group ID")?,
            visibility: req.visibility,
            page: req.page,
            limit: req.limit,
            friend_ids: if viewer_id.is_some() { friend_ids } else { Vec::new() },
        };

        let page = self.service.get_posts(query).await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetPostsResponse {
            posts: page.items.iter().map(view_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn update_post(
        &self,
        request: Request<UpdatePostRequest>,
    ) -> Result<Response<PostResponse>, Status> {
        let caller = self.policy.authorize(&request, "UpdatePost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        info!(post_id = %post_id, user_id = %user_id, "UpdatePost request received");

        let media = req.update_media.then_some(req.media);
        let view = self
            .service
            .update_post(post_id, user_id, &req.content, &req.visibility, media)
            .await?;

        Ok(Response::new(view_to_response(&view)))
    }

    async fn delete_post(
        &self,
        request: Request<DeletePostRequest>,
    ) -> Result<Response<DeletePostResponse>, Status> {
        let caller = self.policy.authorize(&request, "DeletePost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        self.service.delete_post(post_id, user_id).await?;

        Ok(Response::new(DeletePostResponse { success: true }))
    }

    async fn add_comment(
        &self,
        request: Request<AddCommentRequest>,
    ) -> Result<Response<CommentResponse>, Status> {
        let caller = self.policy.authorize(&request, "AddComment")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        let comment = self
            .service
            .add_comment(post_id, user_id, &req.content)
            .await?;

        Ok(Response::new(comment_to_response(&comment)))
    }

    async fn get_comments(
        &self,
        request: Request<GetCommentsRequest>,
    ) -> Result<Response<GetCommentsResponse>, Status> {
        self.policy.authorize(&request, "GetComments")?;
        let req = request.into_inner();
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        let page = self
            .service
            .get_comments(post_id, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetCommentsResponse {
            comments: page.items.iter().map(comment_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn delete_comment(
        &self,
        request: Request<DeleteCommentRequest>,
    ) -> Result<Response<DeleteCommentResponse>, Status> {
        let caller = self.policy.authorize(&request, "DeleteComment")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let comment_id = parse_uuid(&req.comment_id, "comment ID")?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        self.service
            .delete_comment(comment_id, post_id, user_id)
            .await?;

        Ok(Response::new(DeleteCommentResponse { success: true }))
    }

    async fn like_post(
        &self,
        request: Request<LikePostRequest>,
    ) -> Result<Response<LikePostResponse>, Status> {
        let caller = self.policy.authorize(&request, "LikePost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        let likes_count = self.service.like_post(post_id, user_id).await?;

        Ok(Response::new(LikePostResponse {
            success: true,
            likes_count: count_to_i32(likes_count),
        }))
    }

    async fn unlike_post(
        &self,
        request: Request<UnlikePostRequest>,
    ) -> Result<Response<UnlikePostResponse>, Status> {
        let caller = self.policy.authorize(&request, "UnlikePost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        let likes_count = self.service.unlike_post(post_id, user_id).await?;

        Ok(Response::new(UnlikePostResponse {
            success: true,
            likes_count: count_to_i32(likes_count),
        }))
    }

    async fn is_liked(
        &self,
        request: Request<IsLikedRequest>,
    ) -> Result<Response<IsLikedResponse>, Status> {
        let caller = self.policy.authorize(&request, "IsLiked")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let post_id = parse_uuid(&req.post_id, "post ID")?;

        let is_liked = self.service.is_liked(post_id, user_id).await?;

        Ok(Response::new(IsLikedResponse { is_liked }))
    }
}
