use super::{
    authorization_url, exchange_authorization_code, fetch_user_info, IdentityProvider, OAuthError,
};
use crate::config::OAuthClientConfig;
use crate::domain::{Provider, ProviderProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPE: &str = "openid email profile";

#[derive(Clone)]
pub struct GoogleProvider {
    client: OAuthClientConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(client: OAuthClientConfig, http_client: Client) -> Self {
        Self {
            client,
            http_client,
        }
    }
}

impl GoogleUserInfo {
    fn into_profile(self) -> Result<ProviderProfile, OAuthError> {
        let email = self.email.unwrap_or_default();
        if self.sub.is_empty() || email.is_empty() {
            return Err(OAuthError::IncompleteProfile(Provider::Google));
        }

        Ok(ProviderProfile {
            provider_user_id: self.sub,
            name: self.name.unwrap_or_default(),
            email,
            avatar: self.picture.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self, state: &str) -> String {
        authorization_url(AUTHORIZE_URL, &self.client, SCOPE, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        exchange_authorization_code(&self.http_client, Provider::Google, TOKEN_URL, &self.client, code)
            .await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let info: GoogleUserInfo =
            fetch_user_info(&self.http_client, Provider::Google, USERINFO_URL, access_token)
                .await?;
        info.into_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userinfo_maps_to_profile() {
        let info: GoogleUserInfo = serde_json::from_str(
            r#"{"sub":"1234","name":"Ada","email":"ada@example.com","picture":"https://lh3/p.png","email_verified":true}"#,
        )
        .unwrap();

        let profile = info.into_profile().unwrap();
        assert_eq!(profile.provider_user_id, "1234");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.avatar, "https://lh3/p.png");
    }

    #[test]
    fn test_userinfo_without_email_is_incomplete() {
        let info: GoogleUserInfo = serde_json::from_str(r#"{"sub":"1234"}"#).unwrap();
        assert!(matches!(
            info.into_profile(),
            Err(OAuthError::IncompleteProfile(Provider::Google))
        ));
    }

    #[test]
    fn test_authorization_url_targets_google() {
        let provider = GoogleProvider::new(
            OAuthClientConfig {
                client_id: "client".into(),
                client_secret: "secret".into(),
                redirect_url: "http://localhost/cb".into(),
            },
            Client::new(),
        );

        let url = provider.authorization_url("xyz");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("state=xyz"));
    }
}
