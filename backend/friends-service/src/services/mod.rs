mod friends;

pub use friends::FriendService;
