use super::proto::user_service_server::UserService as UserServiceRpc;
use super::proto::*;
use crate::domain::User;
use crate::services::{AuthSession, UserService};
use grpc_jwt_propagation::AccessPolicy;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;

/// Methods callable without a bearer token
pub const PUBLIC_METHODS: &[&str] = &["Register", "Login"];

pub struct UserServiceImpl {
    service: Arc<UserService>,
    policy: AccessPolicy,
}

impl UserServiceImpl {
    pub fn new(service: Arc<UserService>) -> Self {
        Self {
            service,
            policy: AccessPolicy::new(PUBLIC_METHODS),
        }
    }
}

pub(super) fn session_to_response(session: AuthSession) -> AuthResponse {
    AuthResponse {
        user_id: session.user_id.to_string(),
        access_token: session.access_token,
    }
}

fn user_to_profile(user: User) -> UserProfile {
    UserProfile {
        user_id: user.id.to_string(),
        name: user.name,
        email: user.email,
        avatar: user.avatar,
        provider: user.provider,
        created_at: user.created_at.to_rfc3339(),
        updated_at: user.updated_at.to_rfc3339(),
    }
}

#[tonic::async_trait]
impl UserServiceRpc for UserServiceImpl {
    async fn register(
        &self,
        request: Request<AuthRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        info!(provider = %req.provider, "Register request received");

        let session = self
            .service
            .register(&req.provider, &req.access_token)
            .await?;

        Ok(Response::new(session_to_response(session)))
    }

    async fn login(&self, request: Request<AuthRequest>) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        info!(provider = %req.provider, "Login request received");

        let session = self.service.login(&req.provider, &req.access_token).await?;

        Ok(Response::new(session_to_response(session)))
    }

    async fn get_profile(
        &self,
        request: Request<GetProfileRequest>,
    ) -> Result<Response<UserProfile>, Status> {
        let caller = self.policy.authorize(&request, "GetProfile")?;
        let user_id = caller.acting_as(&request.get_ref().user_id)?;

        let user = self.service.get_profile(user_id).await?;

        Ok(Response::new(user_to_profile(user)))
    }

    async fn update_profile(
        &self,
        request: Request<UpdateProfileRequest>,
    ) -> Result<Response<UserProfile>, Status> {
        let caller = self.policy.authorize(&request, "UpdateProfile")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;

        let user = self
            .service
            .update_profile(user_id, &req.name, &req.avatar)
            .await?;

        Ok(Response::new(user_to_profile(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_methods() {
        let policy = AccessPolicy::new(PUBLIC_METHODS);
        assert!(policy.is_public("Register"));
        assert!(policy.is_public("Login"));
        assert!(!policy.is_public("GetProfile"));
        assert!(!policy.is_public("UpdateProfile"));
    }
}
