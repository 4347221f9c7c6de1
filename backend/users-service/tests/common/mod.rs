#![allow(dead_code)]

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use crypto_core::JwtCodec;
use mockall::mock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use users_service::domain::{NewUser, ProfileChanges, Provider, ProviderProfile, User};
use users_service::oauth::{IdentityProvider, IdentityProviders, OAuthError, OAuthStateStore};
use users_service::repository::UserRepository;
use users_service::services::{AuthService, UserService};
use uuid::Uuid;

pub const TEST_SECRET: &str = "users-service-test-secret";

mock! {
    pub Identity {}

    #[async_trait::async_trait]
    impl IdentityProvider for Identity {
        fn provider(&self) -> Provider;
        fn authorization_url(&self, state: &str) -> String;
        async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;
        async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
    }
}

pub fn codec() -> JwtCodec {
    JwtCodec::new(TEST_SECRET).unwrap()
}

pub fn profile(email: &str) -> ProviderProfile {
    ProviderProfile {
        provider_user_id: format!("id-{email}"),
        name: "Test User".to_string(),
        email: email.to_string(),
        avatar: "https://cdn.example.com/avatar.png".to_string(),
    }
}

/// A provider that accepts exactly `token` and resolves it to `email`
pub fn accepting(token: &'static str, email: &'static str) -> MockIdentity {
    let mut identity = MockIdentity::new();
    identity.expect_fetch_profile().returning(move |presented| {
        if presented == token {
            Ok(profile(email))
        } else {
            Err(OAuthError::Rejected {
                provider: Provider::Google,
                status: 401,
            })
        }
    });
    identity
}

pub fn providers(google: MockIdentity, microsoft: MockIdentity) -> IdentityProviders {
    IdentityProviders::new(Arc::new(google), Arc::new(microsoft))
}

/// In-memory users table; emails compare case-insensitively
#[derive(Clone, Default)]
pub struct InMemoryUsers {
    users: Arc<Mutex<Vec<User>>>,
    clock: Arc<AtomicI64>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_service(&self, providers: IdentityProviders) -> UserService {
        UserService::new(Arc::new(self.clone()), providers, codec())
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn now(&self) -> chrono::DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc::now() + ChronoDuration::milliseconds(tick)
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: NewUser) -> Result<Option<User>> {
        let now = self.now();
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Ok(None);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            provider: user.provider.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(Some(created))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
        let now = self.now();
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }
}

/// State store with the same single-use and TTL semantics as Redis
#[derive(Clone, Default)]
pub struct InMemoryStates {
    states: Arc<Mutex<HashMap<String, (Provider, Instant)>>>,
}

impl InMemoryStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states.lock().unwrap().contains_key(state)
    }
}

#[async_trait::async_trait]
impl OAuthStateStore for InMemoryStates {
    async fn save(&self, state: &str, provider: Provider, ttl: Duration) -> Result<()> {
        self.states
            .lock()
            .unwrap()
            .insert(state.to_string(), (provider, Instant::now() + ttl));
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<Provider>> {
        let entry = self.states.lock().unwrap().remove(state);
        Ok(match entry {
            Some((provider, expires_at)) if Instant::now() < expires_at => Some(provider),
            _ => None,
        })
    }
}

/// Wire an AuthService over the given stores and providers
pub fn auth_service(
    users: &InMemoryUsers,
    states: &InMemoryStates,
    google: MockIdentity,
    microsoft: MockIdentity,
) -> AuthService {
    let providers = providers(google, microsoft);
    let user_service = Arc::new(users.user_service(providers.clone()));
    AuthService::new(user_service, providers, Arc::new(states.clone()), codec())
}
