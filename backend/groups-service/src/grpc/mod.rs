mod server;

pub use server::{GroupServiceImpl, PUBLIC_METHODS};

pub mod groups {
    tonic::include_proto!("social.groups.v1");
}
