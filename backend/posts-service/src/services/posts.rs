use crate::domain::models::{placeholder_author_name, placeholder_group_name};
use crate::domain::{
    is_visible_to, Comment, NewComment, NewPost, Post, PostChanges, PostView, Visibility,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{CommentRepository, LikeRepository, PostRepository};
use pagination::{Page, Pagination};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Listing request for GetPosts
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub viewer_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub visibility: String,
    pub page: i32,
    pub limit: i32,
    pub friend_ids: Vec<Uuid>,
}

/// Post, comment and like operations
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
}

/// Whitespace-only content counts as empty
fn require_content(content: &str) -> ServiceResult<()> {
    if content.trim().is_empty() {
        return Err(ServiceError::InvalidInput("content is required".into()));
    }
    Ok(())
}

fn parse_visibility(value: &str) -> ServiceResult<Visibility> {
    value.parse().map_err(|_| {
        ServiceError::InvalidInput("visibility must be 'public' or 'private'".into())
    })
}

fn post_not_found() -> ServiceError {
    ServiceError::NotFound("post not found".into())
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            likes,
        }
    }

    async fn load_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(|e| ServiceError::storage("failed to get post", e))?
            .ok_or_else(post_not_found)
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: &str,
        visibility: &str,
        group_id: Option<Uuid>,
        media: Vec<String>,
    ) -> ServiceResult<Post> {
        require_content(content)?;
        let visibility = parse_visibility(visibility)?;

        let new_post = NewPost {
            author_id,
            author_name: placeholder_author_name(author_id),
            author_avatar: String::new(),
            content: content.to_string(),
            visibility,
            group_id,
            group_name: group_id.map(placeholder_group_name),
            media,
        };

        let post = self
            .posts
            .create(new_post)
            .await
            .map_err(|e| ServiceError::storage("failed to create post", e))?;

        info!(post_id = %post.id, author_id = %author_id, visibility = %visibility, "Post created");
        Ok(post)
    }

    pub async fn get_post(
        &self,
        post_id: Uuid,
        viewer_id: Option<Uuid>,
        friend_ids: &[Uuid],
    ) -> ServiceResult<PostView> {
        let post = self.load_post(post_id).await?;

        if !is_visible_to(&post, viewer_id, friend_ids) {
            return Err(ServiceError::PermissionDenied(
                "you don't have permission to view this post".into(),
            ));
        }

        let is_liked = self.liked_by(post.id, viewer_id).await;
        Ok(PostView { post, is_liked })
    }

    /// Filters are exclusive and checked in order: author, group, public
    /// listing (anonymous viewer or `visibility = "public"`), then everything
    /// the viewer may see. Each page is re-checked by the visibility resolver;
    /// `total_count` is the store count before that check.
    pub async fn get_posts(&self, query: PostQuery) -> ServiceResult<Page<PostView>> {
        let page = Pagination::new(query.page, query.limit);

        let result = if let Some(author_id) = query.author_id {
            self.posts.find_by_author(author_id, page).await
        } else if let Some(group_id) = query.group_id {
            self.posts.find_by_group(group_id, page).await
        } else {
            match query.viewer_id {
                Some(viewer_id) if query.visibility != Visibility::Public.as_str() => {
                    self.posts
                        .find_visible(viewer_id, &query.friend_ids, page)
                        .await
                }
                _ => self.posts.find_public(page).await,
            }
        };

        let (posts, total_count) =
            result.map_err(|e| ServiceError::storage("failed to get posts", e))?;

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            if !is_visible_to(&post, query.viewer_id, &query.friend_ids) {
                debug!(post_id = %post.id, "Dropping post hidden from viewer");
                continue;
            }
            let is_liked = self.liked_by(post.id, query.viewer_id).await;
            views.push(PostView { post, is_liked });
        }

        Ok(page.page_of(views, total_count))
    }

    pub async fn update_post(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        content: &str,
        visibility: &str,
        media: Option<Vec<String>>,
    ) -> ServiceResult<PostView> {
        require_content(content)?;
        let visibility = if visibility.is_empty() {
            None
        } else {
            Some(parse_visibility(visibility)?)
        };

        let post = self.load_post(post_id).await?;
        if post.author_id != requester_id {
            return Err(ServiceError::PermissionDenied(
                "you don't have permission to update this post".into(),
            ));
        }

        let changes = PostChanges {
            content: content.to_string(),
            visibility,
            media,
        };

        let post = self
            .posts
            .update(post_id, changes)
            .await
            .map_err(|e| ServiceError::storage("failed to update post", e))?
            .ok_or_else(post_not_found)?;

        info!(post_id = %post_id, "Post updated");
        let is_liked = self.liked_by(post.id, Some(requester_id)).await;
        Ok(PostView { post, is_liked })
    }

    pub async fn delete_post(&self, post_id: Uuid, requester_id: Uuid) -> ServiceResult<()> {
        let post = self.load_post(post_id).await?;
        if post.author_id != requester_id {
            return Err(ServiceError::PermissionDenied(
                "you don't have permission to delete this post".into(),
            ));
        }

        let deleted = self
            .posts
            .soft_delete(post_id)
            .await
            .map_err(|e| ServiceError::storage("failed to delete post", e))?;
        if !deleted {
            return Err(post_not_found());
        }

        info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> ServiceResult<Comment> {
        require_content(content)?;
        self.load_post(post_id).await?;

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                author_id,
                author_name: placeholder_author_name(author_id),
                author_avatar: String::new(),
                content: content.to_string(),
            })
            .await
            .map_err(|e| ServiceError::storage("failed to create comment", e))?;

        if let Err(e) = self.posts.adjust_comments_count(post_id, 1).await {
            warn!(post_id = %post_id, error = %e, "Failed to increment comments count");
        }

        info!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    pub async fn get_comments(
        &self,
        post_id: Uuid,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<Comment>> {
        let page = Pagination::new(page, limit);
        self.load_post(post_id).await?;

        let (comments, total_count) = self
            .comments
            .find_by_post(post_id, page)
            .await
            .map_err(|e| ServiceError::storage("failed to get comments", e))?;

        Ok(page.page_of(comments, total_count))
    }

    /// Allowed for the comment's author and the post's author
    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        post_id: Uuid,
        requester_id: Uuid,
    ) -> ServiceResult<()> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await
            .map_err(|e| ServiceError::storage("failed to get comment", e))?
            .ok_or_else(|| ServiceError::NotFound("comment not found".into()))?;

        if comment.post_id != post_id {
            return Err(ServiceError::InvalidInput(
                "comment does not belong to the post".into(),
            ));
        }

        let post = self.load_post(post_id).await?;
        if comment.author_id != requester_id && post.author_id != requester_id {
            return Err(ServiceError::PermissionDenied(
                "you don't have permission to delete this comment".into(),
            ));
        }

        let deleted = self
            .comments
            .soft_delete(comment_id)
            .await
            .map_err(|e| ServiceError::storage("failed to delete comment", e))?;
        if !deleted {
            return Err(ServiceError::NotFound("comment not found".into()));
        }

        if let Err(e) = self.posts.adjust_comments_count(post_id, -1).await {
            warn!(post_id = %post_id, error = %e, "Failed to decrement comments count");
        }

        info!(post_id = %post_id, comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    /// Returns the post's like count after the like
    pub async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<i64> {
        self.load_post(post_id).await?;

        let created = self
            .likes
            .create(post_id, user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to like post", e))?;
        if created.is_none() {
            return Err(ServiceError::AlreadyExists(
                "you have already liked this post".into(),
            ));
        }

        let count = self.settle_likes_count(post_id, 1).await;
        info!(post_id = %post_id, user_id = %user_id, likes_count = count, "Post liked");
        Ok(count)
    }

    /// Returns the post's like count after the unlike
    pub async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<i64> {
        self.load_post(post_id).await?;

        let removed = self
            .likes
            .soft_delete(post_id, user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to unlike post", e))?;
        if !removed {
            return Err(ServiceError::NotFound("you have not liked this post".into()));
        }

        let count = self.settle_likes_count(post_id, -1).await;
        info!(post_id = %post_id, user_id = %user_id, likes_count = count, "Post unliked");
        Ok(count)
    }

    pub async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let like = self
            .likes
            .find(post_id, user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to check like", e))?;
        Ok(like.is_some())
    }

    /// Lookup failures read as "not liked"
    async fn liked_by(&self, post_id: Uuid, viewer_id: Option<Uuid>) -> bool {
        let Some(viewer_id) = viewer_id else {
            return false;
        };
        match self.likes.find(post_id, viewer_id).await {
            Ok(like) => like.is_some(),
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "Failed to check like state");
                false
            }
        }
    }

    /// Best-effort counter update; falls back to a live count when the
    /// counter cannot be updated.
    async fn settle_likes_count(&self, post_id: Uuid, delta: i64) -> i64 {
        match self.posts.adjust_likes_count(post_id, delta).await {
            Ok(Some(count)) => return count,
            Ok(None) => warn!(post_id = %post_id, "Post vanished while updating likes count"),
            Err(e) => warn!(post_id = %post_id, error = %e, "Failed to update likes count"),
        }

        match self.likes.count_by_post(post_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "Failed to count likes");
                0
            }
        }
    }
}
