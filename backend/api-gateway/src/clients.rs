//! gRPC clients for the backend services
//!
//! One lazily-connected `Channel` per service. HTTP/2 multiplexing handles
//! concurrency, so handlers build a cheap client per request carrying the
//! caller's credentials.

use crate::config::ServiceEndpoints;
use grpc_jwt_propagation::JwtClientInterceptor;
use std::time::Duration;
use tonic::codegen::InterceptedService;
use tonic::transport::{Channel, Endpoint};

pub mod proto {
    pub mod users {
        tonic::include_proto!("social.users.v1");
    }

    pub mod posts {
        tonic::include_proto!("social.posts.v1");
    }

    pub mod groups {
        tonic::include_proto!("social.groups.v1");
    }

    pub mod friends {
        tonic::include_proto!("social.friends.v1");
    }
}

use proto::friends::friend_service_client::FriendServiceClient;
use proto::groups::group_service_client::GroupServiceClient;
use proto::posts::post_service_client::PostServiceClient;
use proto::users::auth_service_client::AuthServiceClient;
use proto::users::user_service_client::UserServiceClient;

/// A channel that forwards the caller's bearer token
pub type Authorized = InterceptedService<Channel, JwtClientInterceptor>;

#[derive(Clone)]
pub struct ServiceClients {
    users: Channel,
    posts: Channel,
    groups: Channel,
    friends: Channel,
}

impl ServiceClients {
    /// Build lazy channels; nothing connects until the first call.
    ///
    /// ## Errors
    ///
    /// Fails if an endpoint is not a valid URI.
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self, tonic::transport::Error> {
        Ok(Self {
            users: Self::create_channel(&endpoints.users)?,
            posts: Self::create_channel(&endpoints.posts)?,
            groups: Self::create_channel(&endpoints.groups)?,
            friends: Self::create_channel(&endpoints.friends)?,
        })
    }

    /// - connect_lazy: services may start in any order
    /// - keep-alive pings stop proxies from dropping idle connections
    fn create_channel(endpoint: &str) -> Result<Channel, tonic::transport::Error> {
        Ok(Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .http2_keep_alive_interval(Duration::from_secs(60))
            .keep_alive_timeout(Duration::from_secs(20))
            .keep_alive_while_idle(true)
            .connect_lazy())
    }

    pub fn users(&self, auth: JwtClientInterceptor) -> UserServiceClient<Authorized> {
        UserServiceClient::with_interceptor(self.users.clone(), auth)
    }

    pub fn auth(&self) -> AuthServiceClient<Channel> {
        AuthServiceClient::new(self.users.clone())
    }

    pub fn posts(&self, auth: JwtClientInterceptor) -> PostServiceClient<Authorized> {
        PostServiceClient::with_interceptor(self.posts.clone(), auth)
    }

    pub fn groups(&self, auth: JwtClientInterceptor) -> GroupServiceClient<Authorized> {
        GroupServiceClient::with_interceptor(self.groups.clone(), auth)
    }

    pub fn friends(&self, auth: JwtClientInterceptor) -> FriendServiceClient<Authorized> {
        FriendServiceClient::with_interceptor(self.friends.clone(), auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_channels_do_not_connect() {
        // nothing listens here; construction must still succeed
        let endpoints = ServiceEndpoints {
            users: "http://127.0.0.1:1".to_string(),
            ..ServiceEndpoints::default()
        };
        assert!(ServiceClients::new(&endpoints).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_rejected() {
        let endpoints = ServiceEndpoints {
            posts: "not a uri".to_string(),
            ..ServiceEndpoints::default()
        };
        assert!(ServiceClients::new(&endpoints).is_err());
    }
}
