#![allow(dead_code)]

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use groups_service::domain::{
    Group, GroupChanges, GroupMember, GroupPost, GroupPostComment, GroupPostLike, MemberRole,
    NewGroup,
};
use groups_service::repository::{GroupPostRepository, GroupRepository, MemberRepository};
use groups_service::services::GroupService;
use pagination::Pagination;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct State {
    groups: Vec<Group>,
    members: Vec<(GroupMember, bool)>,
    posts: Vec<GroupPost>,
    media: Vec<(Uuid, String)>,
    likes: Vec<GroupPostLike>,
    comments: Vec<GroupPostComment>,
}

/// In-memory groups store; membership tuples carry a deleted flag
#[derive(Clone, Default)]
pub struct InMemoryGroups {
    state: Arc<Mutex<State>>,
    clock: Arc<AtomicI64>,
    fail_member_writes: Arc<AtomicBool>,
}

impl InMemoryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self) -> GroupService {
        GroupService::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    pub fn fail_member_writes(&self, fail: bool) {
        self.fail_member_writes.store(fail, Ordering::SeqCst);
    }

    pub fn seed_like(&self, post_id: Uuid, user_id: Uuid) {
        let created_at = self.now();
        self.state.lock().unwrap().likes.push(GroupPostLike {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at,
        });
    }

    pub fn seed_comment(&self, post_id: Uuid, user_id: Uuid, content: &str) {
        let created_at = self.now();
        self.state.lock().unwrap().comments.push(GroupPostComment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at,
        });
    }

    pub fn set_role(&self, group_id: Uuid, user_id: Uuid, role: MemberRole) {
        let mut state = self.state.lock().unwrap();
        for (member, deleted) in state.members.iter_mut() {
            if member.group_id == group_id && member.user_id == user_id && !*deleted {
                member.role = role.as_str().to_string();
            }
        }
    }

    fn now(&self) -> chrono::DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc::now() + Duration::milliseconds(tick)
    }

    fn live_members(state: &State, group_id: Uuid) -> Vec<GroupMember> {
        state
            .members
            .iter()
            .filter(|(m, deleted)| m.group_id == group_id && !*deleted)
            .map(|(m, _)| m.clone())
            .collect()
    }
}

fn paginate<T>(items: Vec<T>, page: Pagination) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (items, total)
}

#[async_trait::async_trait]
impl GroupRepository for InMemoryGroups {
    async fn create(&self, group: NewGroup) -> Result<Group> {
        let now = self.now();
        let created = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            avatar: group.avatar,
            creator_id: group.creator_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.state.lock().unwrap().groups.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .groups
            .iter()
            .find(|g| g.id == id && !g.is_deleted)
            .cloned())
    }

    async fn search(&self, query: &str, page: Pagination) -> Result<(Vec<Group>, i64)> {
        let needle = query.to_lowercase();
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Group> = state
            .groups
            .iter()
            .filter(|g| !g.is_deleted && g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matching, page))
    }

    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        let Some(group) = state.groups.iter_mut().find(|g| g.id == id && !g.is_deleted) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(description) = changes.description {
            group.description = description;
        }
        if let Some(avatar) = changes.avatar {
            group.avatar = avatar;
        }
        group.updated_at = now;
        Ok(Some(group.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        match state.groups.iter_mut().find(|g| g.id == id && !g.is_deleted) {
            Some(group) => {
                group.is_deleted = true;
                group.deleted_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl MemberRepository for InMemoryGroups {
    async fn add(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<GroupMember>> {
        if self.fail_member_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("member write failed"));
        }
        let joined_at = self.now();
        let mut state = self.state.lock().unwrap();
        if Self::live_members(&state, group_id)
            .iter()
            .any(|m| m.user_id == user_id)
        {
            return Ok(None);
        }
        let member = GroupMember {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role: role.as_str().to_string(),
            joined_at,
        };
        state.members.push((member.clone(), false));
        Ok(Some(member))
    }

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>> {
        let state = self.state.lock().unwrap();
        Ok(Self::live_members(&state, group_id)
            .into_iter()
            .find(|m| m.user_id == user_id))
    }

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        for (member, deleted) in state.members.iter_mut() {
            if member.group_id == group_id && member.user_id == user_id && !*deleted {
                *deleted = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn list(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<GroupMember>, i64)> {
        let state = self.state.lock().unwrap();
        let mut members = Self::live_members(&state, group_id);
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(paginate(members, page))
    }

    async fn count(&self, group_id: Uuid) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(Self::live_members(&state, group_id).len() as i64)
    }
}

#[async_trait::async_trait]
impl GroupPostRepository for InMemoryGroups {
    async fn create(&self, group_id: Uuid, author_id: Uuid, content: &str) -> Result<GroupPost> {
        let now = self.now();
        let post = GroupPost {
            id: Uuid::new_v4(),
            group_id,
            author_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().posts.push(post.clone());
        Ok(post)
    }

    async fn add_media(&self, post_id: Uuid, media_url: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .media
            .push((post_id, media_url.to_string()));
        Ok(())
    }

    async fn find_by_group(
        &self,
        group_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<GroupPost>, i64)> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<GroupPost> = state
            .posts
            .iter()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(posts, page))
    }

    async fn count_by_group(&self, group_id: Uuid) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().filter(|p| p.group_id == group_id).count() as i64)
    }

    async fn media(&self, post_id: Uuid) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .media
            .iter()
            .filter(|(id, _)| *id == post_id)
            .map(|(_, url)| url.clone())
            .collect())
    }

    async fn likes(&self, post_id: Uuid) -> Result<Vec<GroupPostLike>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn comments(
        &self,
        post_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<GroupPostComment>, i64)> {
        let state = self.state.lock().unwrap();
        let mut comments: Vec<GroupPostComment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(comments, page))
    }
}
