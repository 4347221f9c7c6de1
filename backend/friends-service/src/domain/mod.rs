pub mod friend;

pub use friend::{BlockedUser, FriendRequest, Friendship, FriendshipStatus, RequestStatus};
