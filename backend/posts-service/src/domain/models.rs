use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::visibility::Visibility;

/// Post entity
///
/// `likes_count` and `comments_count` are denormalized counters over the live
/// Like and Comment rows of the post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub visibility: String,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub media: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Comment entity, owned by exactly one post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like entity; at most one live like per (post, user)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub visibility: Visibility,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub media: Vec<String>,
}

/// Fields replaced by UpdatePost; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub content: String,
    pub visibility: Option<Visibility>,
    pub media: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
}

/// A post as seen by one viewer
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub is_liked: bool,
}

/// Display name used until profiles are joined in from the users service
pub fn placeholder_author_name(user_id: Uuid) -> String {
    format!("User {}", user_id)
}

pub fn placeholder_group_name(group_id: Uuid) -> String {
    format!("Group {}", group_id)
}
