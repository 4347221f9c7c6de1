//! Entity store for groups, memberships and group posts

mod group_posts;
mod groups;
mod members;

pub use group_posts::PgGroupPostRepository;
pub use groups::PgGroupRepository;
pub use members::PgMemberRepository;

use crate::domain::{
    Group, GroupChanges, GroupMember, GroupPost, GroupPostComment, GroupPostLike, MemberRole,
    NewGroup,
};
use anyhow::Result;
use pagination::Pagination;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: NewGroup) -> Result<Group>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>>;

    /// Case-insensitive substring match on the name; an empty query matches
    /// every group. Newest first.
    async fn search(&self, query: &str, page: Pagination) -> Result<(Vec<Group>, i64)>;

    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait MemberRepository: Send + Sync {
    /// Returns `None` when the user already holds a live membership
    async fn add(&self, group_id: Uuid, user_id: Uuid, role: MemberRole)
        -> Result<Option<GroupMember>>;

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>>;

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Oldest membership first
    async fn list(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<GroupMember>, i64)>;

    async fn count(&self, group_id: Uuid) -> Result<i64>;
}

#[async_trait::async_trait]
pub trait GroupPostRepository: Send + Sync {
    async fn create(&self, group_id: Uuid, author_id: Uuid, content: &str) -> Result<GroupPost>;

    async fn add_media(&self, post_id: Uuid, media_url: &str) -> Result<()>;

    /// Newest first
    async fn find_by_group(&self, group_id: Uuid, page: Pagination)
        -> Result<(Vec<GroupPost>, i64)>;

    async fn count_by_group(&self, group_id: Uuid) -> Result<i64>;

    /// Media URLs in attachment order
    async fn media(&self, post_id: Uuid) -> Result<Vec<String>>;

    async fn likes(&self, post_id: Uuid) -> Result<Vec<GroupPostLike>>;

    /// Newest first
    async fn comments(&self, post_id: Uuid, page: Pagination)
        -> Result<(Vec<GroupPostComment>, i64)>;
}
