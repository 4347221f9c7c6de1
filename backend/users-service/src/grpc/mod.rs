mod auth;
mod users;

pub use auth::AuthServiceImpl;
pub use users::{UserServiceImpl, PUBLIC_METHODS};

pub mod proto {
    tonic::include_proto!("social.users.v1");
}
