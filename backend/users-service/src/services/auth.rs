use super::users::{AuthSession, UserService};
use crate::domain::Provider;
use crate::error::{ServiceError, ServiceResult};
use crate::oauth::{generate_state_token, IdentityProviders, OAuthStateStore};
use crypto_core::JwtCodec;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default lifetime of an issued OAuth state token
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(600);

/// Authorization-code login flows and sign-out
pub struct AuthService {
    users: Arc<UserService>,
    providers: IdentityProviders,
    states: Arc<dyn OAuthStateStore>,
    state_ttl: Duration,
    codec: JwtCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<UserService>,
        providers: IdentityProviders,
        states: Arc<dyn OAuthStateStore>,
        codec: JwtCodec,
    ) -> Self {
        Self {
            users,
            providers,
            states,
            state_ttl: OAUTH_STATE_TTL,
            codec,
        }
    }

    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Issue a state token and build the provider consent URL.
    /// Returns `(url, state)`.
    pub async fn login_url(&self, provider: Provider) -> ServiceResult<(String, String)> {
        let state = generate_state_token();

        self.states
            .save(&state, provider, self.state_ttl)
            .await
            .map_err(|e| ServiceError::storage("failed to store oauth state", e))?;

        let url = self.providers.get(provider).authorization_url(&state);
        info!(provider = %provider, "OAuth login started");
        Ok((url, state))
    }

    /// Consume the state, exchange the code and sign the user in
    pub async fn callback(
        &self,
        provider: Provider,
        code: &str,
        state: &str,
    ) -> ServiceResult<AuthSession> {
        let issued_for = self
            .states
            .take(state)
            .await
            .map_err(|e| ServiceError::storage("failed to verify oauth state", e))?;

        match issued_for {
            Some(issued_for) if issued_for == provider => {}
            Some(issued_for) => {
                warn!(expected = %provider, got = %issued_for, "OAuth state provider mismatch");
                return Err(invalid_state());
            }
            None => return Err(invalid_state()),
        }

        if code.is_empty() {
            return Err(ServiceError::InvalidInput(
                "authorization code is required".into(),
            ));
        }

        let identity = self.providers.get(provider);
        let provider_token = identity.exchange_code(code).await?;
        let profile = identity.fetch_profile(&provider_token).await?;

        let session = self.users.sign_in_with_profile(provider, &profile).await?;
        info!(user_id = %session.user_id, provider = %provider, "OAuth login completed");
        Ok(session)
    }

    /// Tokens are stateless, so signing out only checks the token is ours
    pub fn signout(&self, token: &str) -> ServiceResult<bool> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(ServiceError::InvalidInput("token is required".into()));
        }

        let user_id = self
            .codec
            .user_id_from_token(token)
            .map_err(|_| ServiceError::Unauthenticated("Invalid or expired token".into()))?;

        info!(user_id = %user_id, "User signed out");
        Ok(true)
    }
}

fn invalid_state() -> ServiceError {
    ServiceError::InvalidInput("invalid oauth state".into())
}
