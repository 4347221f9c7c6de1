mod server;

pub use server::{PostServiceImpl, PUBLIC_METHODS};

// Include generated protobuf code
pub mod posts {
    tonic::include_proto!("social.posts.v1");
}
