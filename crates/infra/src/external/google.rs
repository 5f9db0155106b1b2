//! Google OAuth 2.0 client (authorization code flow).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use caregate_auth::strategies::oauth::{
    FederatedProfileSource, FederationError, ProfileName, ProfileValue, RawFederatedProfile,
};

use crate::config::GoogleOAuthConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: &str = "email profile";

#[derive(Debug, Error)]
pub enum OAuthClientError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth: Url,
    pub token: Url,
    pub userinfo: Url,
}

impl GoogleEndpoints {
    pub fn google() -> Result<Self, OAuthClientError> {
        Ok(Self {
            auth: Url::parse(AUTH_ENDPOINT)?,
            token: Url::parse(TOKEN_ENDPOINT)?,
            userinfo: Url::parse(USERINFO_ENDPOINT)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Response of the userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleUserInfo> for RawFederatedProfile {
    fn from(info: GoogleUserInfo) -> Self {
        let name = (info.given_name.is_some() || info.family_name.is_some()).then(|| ProfileName {
            given_name: info.given_name,
            family_name: info.family_name,
        });

        RawFederatedProfile {
            id: info.id,
            display_name: info.name,
            name,
            emails: info.email.into_iter().map(|value| ProfileValue { value }).collect(),
            photos: info.picture.into_iter().map(|value| ProfileValue { value }).collect(),
        }
    }
}

pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: GoogleOAuthConfig,
    endpoints: GoogleEndpoints,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, OAuthClientError> {
        Self::with_endpoints(config, GoogleEndpoints::google()?)
    }

    pub fn with_endpoints(config: GoogleOAuthConfig, endpoints: GoogleEndpoints) -> Result<Self, OAuthClientError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            config,
            endpoints,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthClientError> {
        let response = self
            .http
            .post(self.endpoints.token.clone())
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthClientError::Status {
                endpoint: "token",
                status: response.status().as_u16(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthClientError> {
        let response = self
            .http
            .get(self.endpoints.userinfo.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthClientError::Status {
                endpoint: "userinfo",
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

impl core::fmt::Debug for GoogleOAuthClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GoogleOAuthClient")
            .field("client_id", &self.config.client_id)
            .field("callback_url", &self.config.callback_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FederatedProfileSource for GoogleOAuthClient {
    fn authorization_url(&self) -> Url {
        let mut url = self.endpoints.auth.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.callback_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES);
        url
    }

    async fn fetch_profile(&self, code: &str) -> Result<RawFederatedProfile, FederationError> {
        let access_token = self
            .exchange_code(code)
            .await
            .map_err(|e| FederationError::CodeExchange(e.to_string()))?;

        let info = self
            .user_info(&access_token)
            .await
            .map_err(|e| FederationError::Profile(e.to_string()))?;

        tracing::debug!(provider_id = %info.id, "google userinfo fetched");
        Ok(info.into())
    }
}
