//! `friend_ids` metadata
//!
//! The gateway attaches the caller's friend ids so that the posts service can
//! resolve private-post visibility without calling the friends service.
//! Values may be repeated and each value may hold a comma-separated list.

use tonic::metadata::MetadataMap;
use tracing::debug;
use uuid::Uuid;

pub const FRIEND_IDS_METADATA_KEY: &str = "friend_ids";

/// Friend ids of the caller, stored in request extensions by the server interceptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendIds(pub Vec<Uuid>);

impl FriendIds {
    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }
}

/// Parse every `friend_ids` value; entries that are not UUIDs are skipped.
pub fn parse_friend_ids(metadata: &MetadataMap) -> Vec<Uuid> {
    let mut ids = Vec::new();

    for value in metadata.get_all(FRIEND_IDS_METADATA_KEY).iter() {
        let Ok(raw) = value.to_str() else {
            debug!("Skipping non-ASCII friend_ids value");
            continue;
        };

        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match Uuid::parse_str(part) {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(_) => debug!(value = %part, "Skipping invalid friend id"),
            }
        }
    }

    ids
}
