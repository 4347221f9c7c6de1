//! Visibility Resolver
//!
//! Decides whether a viewer may see a piece of content. The checks run in a
//! fixed order and the first match wins:
//!
//! 1. public content is visible to everyone
//! 2. the author always sees their own content
//! 3. private content is visible to the author's friends
//! 4. content attached to a group is visible to everyone
//!
//! Rule 4 does not check membership. `GetGroupPosts` in groups-service does.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(()),
        }
    }
}

/// Anything the resolver can rule on
pub trait VisibleContent {
    fn visibility(&self) -> Visibility;
    fn author_id(&self) -> Uuid;
    fn group_id(&self) -> Option<Uuid>;
}

impl VisibleContent for Post {
    fn visibility(&self) -> Visibility {
        // Unknown stored values are treated as the stricter setting
        self.visibility.parse().unwrap_or(Visibility::Private)
    }

    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn group_id(&self) -> Option<Uuid> {
        self.group_id
    }
}

/// `viewer` is `None` for anonymous callers.
pub fn is_visible_to<C>(content: &C, viewer: Option<Uuid>, friend_ids: &[Uuid]) -> bool
where
    C: VisibleContent + ?Sized,
{
    let visibility = content.visibility();
    let author_id = content.author_id();

    if visibility == Visibility::Public {
        return true;
    }

    if viewer == Some(author_id) {
        return true;
    }

    if visibility == Visibility::Private && friend_ids.contains(&author_id) {
        return true;
    }

    content.group_id().is_some()
}
