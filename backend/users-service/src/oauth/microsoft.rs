use super::{
    authorization_url, exchange_authorization_code, fetch_user_info, IdentityProvider, OAuthError,
};
use crate::config::OAuthClientConfig;
use crate::domain::{Provider, ProviderProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize";
const TOKEN_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";
const USERINFO_URL: &str = "https://graph.microsoft.com/v1.0/me";
const PHOTO_URL: &str = "https://graph.microsoft.com/v1.0/me/photo/$value";
const SCOPE: &str = "openid email profile User.Read";

#[derive(Clone)]
pub struct MicrosoftProvider {
    client: OAuthClientConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    #[serde(default)]
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
}

impl GraphUser {
    /// `mail` is empty for many personal accounts; fall back to the UPN
    fn into_profile(self, avatar: String) -> Result<ProviderProfile, OAuthError> {
        let email = self
            .mail
            .filter(|mail| !mail.is_empty())
            .or(self.user_principal_name)
            .unwrap_or_default();
        if self.id.is_empty() || email.is_empty() {
            return Err(OAuthError::IncompleteProfile(Provider::Microsoft));
        }

        Ok(ProviderProfile {
            provider_user_id: self.id,
            name: self.display_name.unwrap_or_default(),
            email,
            avatar,
        })
    }
}

impl MicrosoftProvider {
    pub fn new(client: OAuthClientConfig, http_client: Client) -> Self {
        Self {
            client,
            http_client,
        }
    }

    /// Graph serves the photo bytes only; link to it when one exists
    async fn photo_url(&self, access_token: &str) -> String {
        match self
            .http_client
            .get(PHOTO_URL)
            .bearer_auth(access_token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => PHOTO_URL.to_string(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MicrosoftProvider {
    fn provider(&self) -> Provider {
        Provider::Microsoft
    }

    fn authorization_url(&self, state: &str) -> String {
        authorization_url(AUTHORIZE_URL, &self.client, SCOPE, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        exchange_authorization_code(
            &self.http_client,
            Provider::Microsoft,
            TOKEN_URL,
            &self.client,
            code,
        )
        .await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let user: GraphUser =
            fetch_user_info(&self.http_client, Provider::Microsoft, USERINFO_URL, access_token)
                .await?;
        let avatar = self.photo_url(access_token).await;
        user.into_profile(avatar)
    }
}
