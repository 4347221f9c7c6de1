mod server;

pub use server::FriendServiceImpl;

pub mod friends {
    tonic::include_proto!("social.friends.v1");
}
