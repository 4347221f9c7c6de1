use crate::domain::{NewUser, ProfileChanges, Provider, ProviderProfile, User};
use crate::error::{ServiceError, ServiceResult};
use crate::oauth::IdentityProviders;
use crate::repository::UserRepository;
use crypto_core::JwtCodec;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// A signed-in user and the service token issued for them
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub access_token: String,
}

/// User profiles and provider-token sign-in
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    providers: IdentityProviders,
    codec: JwtCodec,
}

pub(crate) fn parse_provider(provider: &str) -> ServiceResult<Provider> {
    provider
        .parse::<Provider>()
        .map_err(|_| ServiceError::InvalidInput("invalid provider".into()))
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, providers: IdentityProviders, codec: JwtCodec) -> Self {
        Self {
            repo,
            providers,
            codec,
        }
    }

    async fn verified_profile(
        &self,
        provider: &str,
        access_token: &str,
    ) -> ServiceResult<(Provider, ProviderProfile)> {
        let provider = parse_provider(provider)?;
        if access_token.is_empty() {
            return Err(ServiceError::InvalidInput("access token is required".into()));
        }

        let profile = self
            .providers
            .get(provider)
            .fetch_profile(access_token)
            .await?;
        Ok((provider, profile))
    }

    /// Create an account from a provider access token.
    /// Fails if the provider's email already belongs to a user.
    pub async fn register(&self, provider: &str, access_token: &str) -> ServiceResult<AuthSession> {
        let (provider, profile) = self.verified_profile(provider, access_token).await?;
        self.register_profile(provider, &profile).await
    }

    /// Sign in with a provider access token; unknown emails are registered
    pub async fn login(&self, provider: &str, access_token: &str) -> ServiceResult<AuthSession> {
        let (provider, profile) = self.verified_profile(provider, access_token).await?;

        match self.find_by_email(&profile.email).await? {
            Some(user) => self.session_for(user.id),
            None => self.register_profile(provider, &profile).await,
        }
    }

    /// Find or create the user behind an already verified provider profile
    pub async fn sign_in_with_profile(
        &self,
        provider: Provider,
        profile: &ProviderProfile,
    ) -> ServiceResult<AuthSession> {
        if let Some(user) = self.find_by_email(&profile.email).await? {
            return self.session_for(user.id);
        }

        match self.create_user(provider, profile).await? {
            Some(user) => self.session_for(user.id),
            // lost a race with a concurrent sign-in for the same email
            None => match self.find_by_email(&profile.email).await? {
                Some(user) => self.session_for(user.id),
                None => Err(ServiceError::Internal("failed to create user".into())),
            },
        }
    }

    async fn register_profile(
        &self,
        provider: Provider,
        profile: &ProviderProfile,
    ) -> ServiceResult<AuthSession> {
        if self.find_by_email(&profile.email).await?.is_some() {
            return Err(ServiceError::AlreadyExists("user already exists".into()));
        }

        let user = self
            .create_user(provider, profile)
            .await?
            .ok_or_else(|| ServiceError::AlreadyExists("user already exists".into()))?;

        self.session_for(user.id)
    }

    async fn create_user(
        &self,
        provider: Provider,
        profile: &ProviderProfile,
    ) -> ServiceResult<Option<User>> {
        let created = self
            .repo
            .create(NewUser::from_profile(provider, profile))
            .await
            .map_err(|e| ServiceError::storage("failed to create user", e))?;

        if let Some(user) = &created {
            info!(user_id = %user.id, provider = %provider, "User registered");
        }
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        self.repo
            .find_by_email(email)
            .await
            .map_err(|e| ServiceError::storage("failed to get user", e))
    }

    fn session_for(&self, user_id: Uuid) -> ServiceResult<AuthSession> {
        let access_token = self.codec.issue_token(user_id).map_err(|e| {
            error!(error = %e, "Failed to issue access token");
            ServiceError::Internal("failed to issue access token".into())
        })?;

        Ok(AuthSession {
            user_id,
            access_token,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> ServiceResult<User> {
        self.repo
            .find_by_id(user_id)
            .await
            .map_err(|e| ServiceError::storage("failed to get user", e))?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))
    }

    /// Non-empty fields replace the stored values
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        avatar: &str,
    ) -> ServiceResult<User> {
        let changes = ProfileChanges::from_request(name, avatar);
        if changes.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self
            .repo
            .update_profile(user_id, changes)
            .await
            .map_err(|e| ServiceError::storage("failed to update user", e))?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))?;

        info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }
}
