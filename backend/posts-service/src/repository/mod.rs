//! Entity store for posts, comments and likes
//!
//! Services depend on the traits; the PostgreSQL implementations live in the
//! submodules. Every read excludes soft-deleted rows.

mod comments;
mod likes;
mod posts;

pub use comments::PgCommentRepository;
pub use likes::PgLikeRepository;
pub use posts::PgPostRepository;

use crate::domain::{Comment, Like, NewComment, NewPost, Post, PostChanges};
use anyhow::Result;
use pagination::Pagination;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// Newest first. Returns (page, total_count).
    async fn find_by_author(&self, author_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)>;

    async fn find_by_group(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)>;

    async fn find_public(&self, page: Pagination) -> Result<(Vec<Post>, i64)>;

    /// Public posts plus private posts written by the viewer or a friend
    async fn find_visible(
        &self,
        viewer_id: Uuid,
        friend_ids: &[Uuid],
        page: Pagination,
    ) -> Result<(Vec<Post>, i64)>;

    /// Returns `None` if the post does not exist
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    /// Tombstones the post together with its comments and likes
    async fn soft_delete(&self, id: Uuid) -> Result<bool>;

    /// Atomically add `delta` to the likes counter, never going below zero
    async fn adjust_likes_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>>;

    async fn adjust_comments_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Newest first. Returns (page, total_count).
    async fn find_by_post(&self, post_id: Uuid, page: Pagination) -> Result<(Vec<Comment>, i64)>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    /// Returns `None` when a live like already exists for the pair
    async fn create(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>>;

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>>;

    /// Returns false when there was no live like to remove
    async fn soft_delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64>;
}
