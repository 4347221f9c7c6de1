//! In-memory entity store for service tests
//!
//! Mirrors the PostgreSQL repositories closely enough to exercise the service
//! rules without a database: soft deletes, newest-first ordering and the
//! one-live-like-per-pair constraint.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use pagination::Pagination;
use posts_service::domain::{Comment, Like, NewComment, NewPost, Post, PostChanges};
use posts_service::repository::{CommentRepository, LikeRepository, PostRepository};
use posts_service::services::PostService;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<AtomicI64>,
    fail_counters: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every counter update fail, as a flaky database would
    pub fn fail_counter_updates(&self, fail: bool) {
        self.fail_counters.store(fail, Ordering::SeqCst);
    }

    pub fn service(&self) -> PostService {
        PostService::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    pub fn live_like_count(&self, post_id: Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state
            .likes
            .iter()
            .filter(|l| l.post_id == post_id && !l.is_deleted)
            .count()
    }

    pub fn stored_post(&self, post_id: Uuid) -> Option<Post> {
        let state = self.state.lock().unwrap();
        state.posts.iter().find(|p| p.id == post_id).cloned()
    }

    /// Strictly increasing timestamps so ordering is deterministic
    fn now(&self) -> chrono::DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc::now() + Duration::milliseconds(tick)
    }

    fn page_posts<F>(&self, page: Pagination, filter: F) -> (Vec<Post>, i64)
    where
        F: Fn(&Post) -> bool,
    {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| !p.is_deleted && filter(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        (items, total)
    }

    fn adjust(&self, id: Uuid, delta: i64, likes: bool) -> Result<Option<i64>> {
        if self.fail_counters.load(Ordering::SeqCst) {
            return Err(anyhow!("counter update failed"));
        }
        let mut state = self.state.lock().unwrap();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id && !p.is_deleted) else {
            return Ok(None);
        };
        let counter = if likes {
            &mut post.likes_count
        } else {
            &mut post.comments_count
        };
        *counter = (*counter + delta).max(0);
        Ok(Some(*counter))
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let now = self.now();
        let created = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            author_name: post.author_name,
            author_avatar: post.author_avatar,
            content: post.content,
            visibility: post.visibility.as_str().to_string(),
            group_id: post.group_id,
            group_name: post.group_name,
            media: post.media,
            likes_count: 0,
            comments_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.state.lock().unwrap().posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned())
    }

    async fn find_by_author(&self, author_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)> {
        Ok(self.page_posts(page, |p| p.author_id == author_id))
    }

    async fn find_by_group(&self, group_id: Uuid, page: Pagination) -> Result<(Vec<Post>, i64)> {
        Ok(self.page_posts(page, |p| p.group_id == Some(group_id)))
    }

    async fn find_public(&self, page: Pagination) -> Result<(Vec<Post>, i64)> {
        Ok(self.page_posts(page, |p| p.visibility == "public"))
    }

    async fn find_visible(
        &self,
        viewer_id: Uuid,
        friend_ids: &[Uuid],
        page: Pagination,
    ) -> Result<(Vec<Post>, i64)> {
        Ok(self.page_posts(page, |p| {
            p.visibility == "public"
                || p.author_id == viewer_id
                || (p.visibility == "private" && friend_ids.contains(&p.author_id))
        }))
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id && !p.is_deleted) else {
            return Ok(None);
        };
        post.content = changes.content;
        if let Some(visibility) = changes.visibility {
            post.visibility = visibility.as_str().to_string();
        }
        if let Some(media) = changes.media {
            post.media = media;
        }
        post.updated_at = now;
        Ok(Some(post.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id && !p.is_deleted) else {
            return Ok(false);
        };
        post.is_deleted = true;
        post.deleted_at = Some(now);

        for comment in state.comments.iter_mut().filter(|c| c.post_id == id) {
            comment.is_deleted = true;
        }
        for like in state.likes.iter_mut().filter(|l| l.post_id == id) {
            like.is_deleted = true;
        }
        Ok(true)
    }

    async fn adjust_likes_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>> {
        self.adjust(id, delta, true)
    }

    async fn adjust_comments_count(&self, id: Uuid, delta: i64) -> Result<Option<i64>> {
        self.adjust(id, delta, false)
    }
}

#[async_trait::async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let now = self.now();
        let created = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_name: comment.author_name,
            author_avatar: comment.author_avatar,
            content: comment.content,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().comments.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == id && !c.is_deleted)
            .cloned())
    }

    async fn find_by_post(&self, post_id: Uuid, page: Pagination) -> Result<(Vec<Comment>, i64)> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && !c.is_deleted)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.comments.iter_mut().find(|c| c.id == id && !c.is_deleted) {
            Some(comment) => {
                comment.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl LikeRepository for InMemoryStore {
    async fn create(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        if state
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id && !l.is_deleted)
        {
            return Ok(None);
        }
        let like = Like {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            is_deleted: false,
            created_at: now,
        };
        state.likes.push(like.clone());
        Ok(Some(like))
    }

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .likes
            .iter()
            .find(|l| l.post_id == post_id && l.user_id == user_id && !l.is_deleted)
            .cloned())
    }

    async fn soft_delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .likes
            .iter_mut()
            .find(|l| l.post_id == post_id && l.user_id == user_id && !l.is_deleted)
        {
            Some(like) => {
                like.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64> {
        Ok(self.live_like_count(post_id) as i64)
    }
}
