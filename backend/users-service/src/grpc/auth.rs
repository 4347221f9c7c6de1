use super::proto::auth_service_server::AuthService as AuthServiceRpc;
use super::proto::*;
use super::users::session_to_response;
use crate::domain::Provider;
use crate::services::AuthService;
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// OAuth handlers. Every method is callable anonymously; Signout checks the
/// token carried in its body.
pub struct AuthServiceImpl {
    service: Arc<AuthService>,
}

impl AuthServiceImpl {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }

    async fn login(&self, provider: Provider) -> Result<Response<OAuthLoginResponse>, Status> {
        let (url, state) = self.service.login_url(provider).await?;
        Ok(Response::new(OAuthLoginResponse { url, state }))
    }

    async fn callback(
        &self,
        provider: Provider,
        request: Request<OAuthCallbackRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        let session = self
            .service
            .callback(provider, &req.code, &req.state)
            .await?;
        Ok(Response::new(session_to_response(session)))
    }
}

#[tonic::async_trait]
impl AuthServiceRpc for AuthServiceImpl {
    async fn google_login(
        &self,
        _request: Request<OAuthLoginRequest>,
    ) -> Result<Response<OAuthLoginResponse>, Status> {
        self.login(Provider::Google).await
    }

    async fn google_callback(
        &self,
        request: Request<OAuthCallbackRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        self.callback(Provider::Google, request).await
    }

    async fn microsoft_login(
        &self,
        _request: Request<OAuthLoginRequest>,
    ) -> Result<Response<OAuthLoginResponse>, Status> {
        self.login(Provider::Microsoft).await
    }

    async fn microsoft_callback(
        &self,
        request: Request<OAuthCallbackRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        self.callback(Provider::Microsoft, request).await
    }

    async fn signout(
        &self,
        request: Request<SignoutRequest>,
    ) -> Result<Response<SignoutResponse>, Status> {
        let success = self.service.signout(&request.get_ref().token)?;
        Ok(Response::new(SignoutResponse { success }))
    }
}
