#![allow(dead_code)]

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use friends_service::domain::{BlockedUser, FriendRequest, Friendship, RequestStatus};
use friends_service::repository::FriendRepository;
use friends_service::services::FriendService;
use pagination::Pagination;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct State {
    requests: Vec<(FriendRequest, bool)>,
    friendships: Vec<(Friendship, bool)>,
    blocks: Vec<(BlockedUser, bool)>,
}

/// In-memory friend graph; each row carries a deleted flag
#[derive(Clone, Default)]
pub struct InMemoryFriends {
    state: Arc<Mutex<State>>,
    clock: Arc<AtomicI64>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryFriends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self) -> FriendService {
        FriendService::new(Arc::new(self.clone()))
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Live friendship rows in either direction between the pair
    pub fn friendship_rows(&self, a: Uuid, b: Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state
            .friendships
            .iter()
            .filter(|(f, deleted)| {
                !*deleted
                    && ((f.user_id == a && f.friend_id == b) || (f.user_id == b && f.friend_id == a))
            })
            .count()
    }

    fn now(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc::now() + Duration::milliseconds(tick)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("read failed"));
        }
        Ok(())
    }

    fn settle(&self, request_id: Uuid, status: RequestStatus) -> Option<FriendRequest> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        let (request, _) = state
            .requests
            .iter_mut()
            .find(|(r, deleted)| r.id == request_id && !*deleted && r.is_pending())?;
        request.status = status.as_str().to_string();
        request.updated_at = now;
        Some(request.clone())
    }
}

/// Newest first, like the SQL listings
fn paginate<T>(
    mut items: Vec<T>,
    page: Pagination,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> (Vec<T>, i64) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (items, total)
}

#[async_trait::async_trait]
impl FriendRepository for InMemoryFriends {
    async fn create_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<Option<FriendRequest>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        if state.requests.iter().any(|(r, deleted)| {
            !*deleted && r.sender_id == sender_id && r.receiver_id == receiver_id
        }) {
            return Ok(None);
        }
        let request = FriendRequest {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status: RequestStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        state.requests.push((request.clone(), false));
        Ok(Some(request))
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .find(|(r, deleted)| r.id == request_id && !*deleted)
            .map(|(r, _)| r.clone()))
    }

    async fn requests_for_receiver(
        &self,
        receiver_id: Uuid,
        status: Option<RequestStatus>,
        page: Pagination,
    ) -> Result<(Vec<FriendRequest>, i64)> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let matching: Vec<FriendRequest> = state
            .requests
            .iter()
            .filter(|(r, deleted)| {
                !*deleted
                    && r.receiver_id == receiver_id
                    && status.map_or(true, |s| r.status == s.as_str())
            })
            .map(|(r, _)| r.clone())
            .collect();
        Ok(paginate(matching, page, |r| r.created_at))
    }

    async fn accept_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        let Some(request) = self.settle(request_id, RequestStatus::Accepted) else {
            return Ok(None);
        };
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        for (user_id, friend_id) in [
            (request.sender_id, request.receiver_id),
            (request.receiver_id, request.sender_id),
        ] {
            let exists = state
                .friendships
                .iter()
                .any(|(f, deleted)| !*deleted && f.user_id == user_id && f.friend_id == friend_id);
            if !exists {
                state.friendships.push((
                    Friendship {
                        id: Uuid::new_v4(),
                        user_id,
                        friend_id,
                        created_at: now,
                    },
                    false,
                ));
            }
        }
        Ok(Some(request))
    }

    async fn reject_request(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        Ok(self.settle(request_id, RequestStatus::Rejected))
    }

    async fn pending_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<FriendRequest>> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .filter(|(r, deleted)| {
                !*deleted
                    && r.is_pending()
                    && ((r.sender_id == user_a && r.receiver_id == user_b)
                        || (r.sender_id == user_b && r.receiver_id == user_a))
            })
            .map(|(r, _)| r.clone())
            .max_by_key(|r| r.created_at))
    }

    async fn are_friends(&self, user_id: Uuid, friend_id: Uuid) -> Result<bool> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .friendships
            .iter()
            .any(|(f, deleted)| !*deleted && f.user_id == user_id && f.friend_id == friend_id))
    }

    async fn friends_of(&self, user_id: Uuid, page: Pagination) -> Result<(Vec<Friendship>, i64)> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let friends: Vec<Friendship> = state
            .friendships
            .iter()
            .filter(|(f, deleted)| !*deleted && f.user_id == user_id)
            .map(|(f, _)| f.clone())
            .collect();
        Ok(paginate(friends, page, |f| f.created_at))
    }

    async fn remove_friendship(&self, user_a: Uuid, user_b: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let pair = |a: Uuid, b: Uuid| (a == user_a && b == user_b) || (a == user_b && b == user_a);

        let mut removed = false;
        for (friendship, deleted) in state.friendships.iter_mut() {
            if !*deleted && pair(friendship.user_id, friendship.friend_id) {
                *deleted = true;
                removed = true;
            }
        }
        if !removed {
            return Ok(false);
        }
        for (request, deleted) in state.requests.iter_mut() {
            if !*deleted
                && request.status == RequestStatus::Accepted.as_str()
                && pair(request.sender_id, request.receiver_id)
            {
                *deleted = true;
            }
        }
        Ok(true)
    }

    async fn block(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<Option<BlockedUser>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        if state.blocks.iter().any(|(b, deleted)| {
            !*deleted && b.user_id == user_id && b.blocked_user_id == blocked_user_id
        }) {
            return Ok(None);
        }
        let blocked = BlockedUser {
            id: Uuid::new_v4(),
            user_id,
            blocked_user_id,
            created_at: now,
        };
        state.blocks.push((blocked.clone(), false));
        Ok(Some(blocked))
    }

    async fn unblock(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.blocks.iter_mut().find(|(b, deleted)| {
            !*deleted && b.user_id == user_id && b.blocked_user_id == blocked_user_id
        }) {
            Some((_, deleted)) => {
                *deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn is_blocked(&self, user_id: Uuid, blocked_user_id: Uuid) -> Result<bool> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        Ok(state.blocks.iter().any(|(b, deleted)| {
            !*deleted && b.user_id == user_id && b.blocked_user_id == blocked_user_id
        }))
    }

    async fn blocked_by(&self, user_id: Uuid, page: Pagination) -> Result<(Vec<BlockedUser>, i64)> {
        self.check_reads()?;
        let state = self.state.lock().unwrap();
        let blocked: Vec<BlockedUser> = state
            .blocks
            .iter()
            .filter(|(b, deleted)| !*deleted && b.user_id == user_id)
            .map(|(b, _)| b.clone())
            .collect();
        Ok(paginate(blocked, page, |b| b.created_at))
    }
}
