use crate::domain::{
    Group, GroupChanges, GroupDetails, GroupMember, GroupPost, GroupPostDetails, MemberRole,
    NewGroup,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{GroupPostRepository, GroupRepository, MemberRepository};
use pagination::{Page, Pagination};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Comments loaded with each post by GetGroupPosts
const HYDRATED_COMMENTS: i32 = 100;

fn not_a_member() -> ServiceError {
    ServiceError::PermissionDenied("not a member of this group".into())
}

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    members: Arc<dyn MemberRepository>,
    posts: Arc<dyn GroupPostRepository>,
}

impl GroupService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        members: Arc<dyn MemberRepository>,
        posts: Arc<dyn GroupPostRepository>,
    ) -> Self {
        Self {
            groups,
            members,
            posts,
        }
    }

    async fn load_group(&self, group_id: Uuid) -> ServiceResult<Group> {
        self.groups
            .find_by_id(group_id)
            .await
            .map_err(|e| ServiceError::storage("failed to get group", e))?
            .ok_or_else(|| ServiceError::NotFound("group not found".into()))
    }

    async fn membership(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<Option<GroupMember>> {
        self.members
            .find(group_id, user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to check membership", e))
    }

    /// Attach counters and the viewer's membership; lookup failures degrade
    /// to zero / false.
    async fn details(&self, group: Group, viewer_id: Option<Uuid>) -> GroupDetails {
        let members_count = self.members.count(group.id).await.unwrap_or_else(|e| {
            warn!(group_id = %group.id, error = %e, "Failed to count group members");
            0
        });

        let posts_count = self.posts.count_by_group(group.id).await.unwrap_or_else(|e| {
            warn!(group_id = %group.id, error = %e, "Failed to count group posts");
            0
        });

        let is_member = match viewer_id {
            Some(viewer_id) => match self.members.find(group.id, viewer_id).await {
                Ok(member) => member.is_some(),
                Err(e) => {
                    warn!(group_id = %group.id, error = %e, "Failed to check membership");
                    false
                }
            },
            None => false,
        };

        GroupDetails {
            group,
            members_count,
            posts_count,
            is_member,
        }
    }

    async fn members_count(&self, group_id: Uuid) -> i64 {
        self.members.count(group_id).await.unwrap_or_else(|e| {
            warn!(group_id = %group_id, error = %e, "Failed to count group members");
            0
        })
    }

    /// The creator is enrolled with role "creator"; a failed enrollment is
    /// logged and the group is still returned.
    pub async fn create_group(
        &self,
        creator_id: Uuid,
        name: &str,
        description: &str,
        avatar: &str,
    ) -> ServiceResult<GroupDetails> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("group name is required".into()));
        }

        let group = self
            .groups
            .create(NewGroup {
                name: name.to_string(),
                description: description.to_string(),
                avatar: avatar.to_string(),
                creator_id,
            })
            .await
            .map_err(|e| ServiceError::storage("failed to create group", e))?;

        if let Err(e) = self
            .members
            .add(group.id, creator_id, MemberRole::Creator)
            .await
        {
            warn!(group_id = %group.id, error = %e, "Failed to enroll group creator");
        }

        info!(group_id = %group.id, creator_id = %creator_id, "Group created");
        Ok(self.details(group, Some(creator_id)).await)
    }

    pub async fn get_group(
        &self,
        group_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> ServiceResult<GroupDetails> {
        let group = self.load_group(group_id).await?;
        Ok(self.details(group, viewer_id).await)
    }

    pub async fn get_groups(
        &self,
        viewer_id: Option<Uuid>,
        query: &str,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<GroupDetails>> {
        let page = Pagination::new(page, limit);
        let (groups, total_count) = self
            .groups
            .search(query.trim(), page)
            .await
            .map_err(|e| ServiceError::storage("failed to get groups", e))?;

        let mut items = Vec::with_capacity(groups.len());
        for group in groups {
            items.push(self.details(group, viewer_id).await);
        }

        Ok(page.page_of(items, total_count))
    }

    pub async fn update_group(
        &self,
        group_id: Uuid,
        requester_id: Uuid,
        name: &str,
        description: &str,
        avatar: &str,
    ) -> ServiceResult<GroupDetails> {
        self.load_group(group_id).await?;

        let allowed = self
            .membership(group_id, requester_id)
            .await?
            .is_some_and(|member| member.role().can_manage());
        if !allowed {
            return Err(ServiceError::PermissionDenied(
                "only the creator or an admin can update the group".into(),
            ));
        }

        let group = self
            .groups
            .update(group_id, GroupChanges::from_request(name, description, avatar))
            .await
            .map_err(|e| ServiceError::storage("failed to update group", e))?
            .ok_or_else(|| ServiceError::NotFound("group not found".into()))?;

        info!(group_id = %group_id, "Group updated");
        Ok(self.details(group, Some(requester_id)).await)
    }

    pub async fn delete_group(&self, group_id: Uuid, requester_id: Uuid) -> ServiceResult<()> {
        let group = self.load_group(group_id).await?;
        if group.creator_id != requester_id {
            return Err(ServiceError::PermissionDenied(
                "only the creator can delete the group".into(),
            ));
        }

        let deleted = self
            .groups
            .soft_delete(group_id)
            .await
            .map_err(|e| ServiceError::storage("failed to delete group", e))?;
        if !deleted {
            return Err(ServiceError::NotFound("group not found".into()));
        }

        info!(group_id = %group_id, "Group deleted");
        Ok(())
    }

    /// Returns the member count after joining
    pub async fn join_group(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<i64> {
        self.load_group(group_id).await?;

        let added = self
            .members
            .add(group_id, user_id, MemberRole::Member)
            .await
            .map_err(|e| ServiceError::storage("failed to join group", e))?;
        if added.is_none() {
            return Err(ServiceError::AlreadyExists(
                "already a member of this group".into(),
            ));
        }

        info!(group_id = %group_id, user_id = %user_id, "User joined group");
        Ok(self.members_count(group_id).await)
    }

    /// Returns the member count after leaving
    pub async fn leave_group(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<i64> {
        let group = self.load_group(group_id).await?;

        if self.membership(group_id, user_id).await?.is_none() {
            return Err(ServiceError::NotFound("not a member of this group".into()));
        }
        if group.creator_id == user_id {
            return Err(ServiceError::FailedPrecondition(
                "creator cannot leave the group".into(),
            ));
        }

        let removed = self
            .members
            .remove(group_id, user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to leave group", e))?;
        if !removed {
            return Err(ServiceError::NotFound("not a member of this group".into()));
        }

        info!(group_id = %group_id, user_id = %user_id, "User left group");
        Ok(self.members_count(group_id).await)
    }

    pub async fn get_group_members(
        &self,
        group_id: Uuid,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<GroupMember>> {
        let page = Pagination::new(page, limit);
        self.load_group(group_id).await?;

        let (members, total_count) = self
            .members
            .list(group_id, page)
            .await
            .map_err(|e| ServiceError::storage("failed to get group members", e))?;

        Ok(page.page_of(members, total_count))
    }

    /// Media rows are attached best-effort after the post is stored
    pub async fn create_group_post(
        &self,
        group_id: Uuid,
        author_id: Uuid,
        content: &str,
        media: &[String],
    ) -> ServiceResult<GroupPostDetails> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidInput("content is required".into()));
        }

        self.load_group(group_id).await?;
        if self.membership(group_id, author_id).await?.is_none() {
            return Err(not_a_member());
        }

        let post = self
            .posts
            .create(group_id, author_id, content)
            .await
            .map_err(|e| ServiceError::storage("failed to create group post", e))?;

        for url in media.iter().filter(|url| !url.is_empty()) {
            if let Err(e) = self.posts.add_media(post.id, url).await {
                warn!(post_id = %post.id, error = %e, "Failed to attach media to group post");
            }
        }

        info!(group_id = %group_id, post_id = %post.id, "Group post created");
        Ok(self.hydrate(post).await)
    }

    /// Members only. Each post carries its media, likes and up to 100 of its
    /// newest comments.
    pub async fn get_group_posts(
        &self,
        group_id: Uuid,
        viewer_id: Option<Uuid>,
        page: i32,
        limit: i32,
    ) -> ServiceResult<Page<GroupPostDetails>> {
        let page = Pagination::new(page, limit);
        self.load_group(group_id).await?;

        let Some(viewer_id) = viewer_id else {
            return Err(not_a_member());
        };
        if self.membership(group_id, viewer_id).await?.is_none() {
            return Err(not_a_member());
        }

        let (posts, total_count) = self
            .posts
            .find_by_group(group_id, page)
            .await
            .map_err(|e| ServiceError::storage("failed to get group posts", e))?;

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.hydrate(post).await);
        }

        Ok(page.page_of(items, total_count))
    }

    async fn hydrate(&self, post: GroupPost) -> GroupPostDetails {
        let media = self.posts.media(post.id).await.unwrap_or_else(|e| {
            warn!(post_id = %post.id, error = %e, "Failed to load group post media");
            Vec::new()
        });

        let likes = self.posts.likes(post.id).await.unwrap_or_else(|e| {
            warn!(post_id = %post.id, error = %e, "Failed to load group post likes");
            Vec::new()
        });

        let (comments, comments_count) = self
            .posts
            .comments(post.id, Pagination::new(1, HYDRATED_COMMENTS))
            .await
            .unwrap_or_else(|e| {
                warn!(post_id = %post.id, error = %e, "Failed to load group post comments");
                (Vec::new(), 0)
            });

        GroupPostDetails {
            post,
            media,
            likes,
            comments,
            comments_count,
        }
    }
}
