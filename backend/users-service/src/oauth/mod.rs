//! OAuth 2.0 identity providers and the CSRF state store
//!
//! Providers exchange authorization codes and resolve access tokens to a
//! [`ProviderProfile`]. State tokens live in Redis with a TTL and are consumed
//! on first use.

mod google;
mod microsoft;
mod state;

pub use google::GoogleProvider;
pub use microsoft::MicrosoftProvider;
pub use state::{generate_state_token, OAuthStateStore, RedisStateStore};

use crate::config::{OAuthClientConfig, OAuthConfig};
use crate::domain::{Provider, ProviderProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider answered with a non-success status
    #[error("{provider} rejected the request (status {status})")]
    Rejected { provider: Provider, status: u16 },

    #[error("Failed to exchange token: {0}")]
    TokenExchange(String),

    #[error("Incomplete user info from {0}")]
    IncompleteProfile(Provider),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        OAuthError::Network(err.to_string())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Consent page URL carrying `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Trade an authorization code for a provider access token
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;

    /// Resolve a provider access token to the signed-in user's profile
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
}

/// The configured providers, looked up by [`Provider`]
#[derive(Clone)]
pub struct IdentityProviders {
    google: Arc<dyn IdentityProvider>,
    microsoft: Arc<dyn IdentityProvider>,
}

impl IdentityProviders {
    pub fn new(google: Arc<dyn IdentityProvider>, microsoft: Arc<dyn IdentityProvider>) -> Self {
        Self { google, microsoft }
    }

    /// Build the reqwest-backed providers with a shared client
    pub fn from_config(config: &OAuthConfig) -> Result<Self, OAuthError> {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::new(
            Arc::new(GoogleProvider::new(config.google.clone(), http_client.clone())),
            Arc::new(MicrosoftProvider::new(config.microsoft.clone(), http_client)),
        ))
    }

    pub fn get(&self, provider: Provider) -> &Arc<dyn IdentityProvider> {
        match provider {
            Provider::Google => &self.google,
            Provider::Microsoft => &self.microsoft,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// POST the authorization-code grant to `token_url`
async fn exchange_authorization_code(
    http_client: &Client,
    provider: Provider,
    token_url: &str,
    client: &OAuthClientConfig,
    code: &str,
) -> Result<String, OAuthError> {
    let response = http_client
        .post(token_url)
        .form(&[
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", client.redirect_url.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(OAuthError::Rejected {
            provider,
            status: response.status().as_u16(),
        });
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| OAuthError::TokenExchange(format!("JSON parse error: {e}")))?;

    Ok(token.access_token)
}

/// GET a user-info document with the provider access token as bearer
async fn fetch_user_info<T: serde::de::DeserializeOwned>(
    http_client: &Client,
    provider: Provider,
    url: &str,
    access_token: &str,
) -> Result<T, OAuthError> {
    let response = http_client.get(url).bearer_auth(access_token).send().await?;

    if !response.status().is_success() {
        return Err(OAuthError::Rejected {
            provider,
            status: response.status().as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| OAuthError::Network(format!("Failed to parse user info: {e}")))
}

fn authorization_url(
    base: &str,
    client: &OAuthClientConfig,
    scope: &str,
    state: &str,
) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        base,
        urlencoding::encode(&client.client_id),
        urlencoding::encode(&client.redirect_url),
        urlencoding::encode(scope),
        urlencoding::encode(state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = OAuthClientConfig {
            client_id: "abc 123".into(),
            client_secret: "secret".into(),
            redirect_url: "http://localhost:8080/api/v1/auth/google/callback".into(),
        };

        let url = authorization_url("https://example.com/auth", &client, "openid email", "s1");

        assert!(url.starts_with("https://example.com/auth?client_id=abc%20123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fapi%2Fv1%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email"));
        assert!(url.ends_with("&state=s1"));
        assert!(!url.contains("secret"));
    }

    #[test]
    fn test_rejected_error_names_provider() {
        let err = OAuthError::Rejected {
            provider: Provider::Microsoft,
            status: 401,
        };
        assert_eq!(err.to_string(), "microsoft rejected the request (status 401)");
    }
}
