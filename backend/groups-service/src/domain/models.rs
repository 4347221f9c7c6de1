use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub creator_id: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Creator,
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Creator => "creator",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }

    /// Creator and admins may edit group details
    pub fn can_manage(&self) -> bool {
        matches!(self, MemberRole::Creator | MemberRole::Admin)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(MemberRole::Creator),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            _ => Err(()),
        }
    }
}

/// Live membership of one user in one group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    /// Unknown stored roles get no management rights
    pub fn role(&self) -> MemberRole {
        self.role.parse().unwrap_or(MemberRole::Member)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupPost {
    pub id: Uuid,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupPostLike {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupPostComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub creator_id: Uuid,
}

/// Non-empty fields replace the stored values
#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

impl GroupChanges {
    pub fn from_request(name: &str, description: &str, avatar: &str) -> Self {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            name: non_empty(name),
            description: non_empty(description),
            avatar: non_empty(avatar),
        }
    }
}

/// A group with the counters and membership flag shown to one viewer
#[derive(Debug, Clone)]
pub struct GroupDetails {
    pub group: Group,
    pub members_count: i64,
    pub posts_count: i64,
    pub is_member: bool,
}

/// A group post with its media, likes and first page of comments
#[derive(Debug, Clone)]
pub struct GroupPostDetails {
    pub post: GroupPost,
    pub media: Vec<String>,
    pub likes: Vec<GroupPostLike>,
    pub comments: Vec<GroupPostComment>,
    pub comments_count: i64,
}

impl GroupPostDetails {
    pub fn is_liked_by(&self, viewer_id: Option<Uuid>) -> bool {
        viewer_id.is_some_and(|viewer| self.likes.iter().any(|like| like.user_id == viewer))
    }
}

/// Display name used until profiles are joined in from the users service
pub fn placeholder_user_name(user_id: Uuid) -> String {
    format!("User {}", user_id)
}
