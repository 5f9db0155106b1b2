//! OAuth federation: provider profiles and their validation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::error::AuthError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    Google,
}

/// Raw principal of a federated login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthPrincipal {
    pub provider: Provider,
    pub provider_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileValue {
    pub value: String,
}

/// Profile as handed over by the provider, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFederatedProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<ProfileName>,
    #[serde(default)]
    pub emails: Vec<ProfileValue>,
    #[serde(default)]
    pub photos: Vec<ProfileValue>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FederationError {
    #[error("authorization code exchange failed: {0}")]
    CodeExchange(String),

    #[error("profile fetch failed: {0}")]
    Profile(String),
}

/// Turns an authorization code into the provider's profile.
#[async_trait]
pub trait FederatedProfileSource: Send + Sync {
    /// Consent screen the user is sent to.
    fn authorization_url(&self) -> Url;

    async fn fetch_profile(&self, code: &str) -> Result<RawFederatedProfile, FederationError>;
}

const FAILED: &str = "Google authentication failed";

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Map and validate a Google profile.
pub fn verify_federated_profile(raw: RawFederatedProfile) -> Result<OAuthPrincipal, AuthError> {
    let reject = |why: &str| {
        tracing::debug!(reason = why, "federated profile rejected");
        AuthError::unauthorized(FAILED)
    };

    if raw.id.trim().is_empty() {
        return Err(reject("missing provider id"));
    }

    let email = raw
        .emails
        .into_iter()
        .next()
        .map(|e| e.value)
        .ok_or_else(|| reject("missing email"))?;
    if !is_email(&email) {
        return Err(reject("invalid email"));
    }

    let name = raw.name.and_then(|n| n.given_name);
    if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(reject("empty name"));
    }

    let avatar_url = raw.photos.into_iter().next().map(|p| p.value);
    if avatar_url.as_deref().is_some_and(|u| !is_http_url(u)) {
        return Err(reject("invalid avatar url"));
    }

    Ok(OAuthPrincipal {
        provider: Provider::Google,
        provider_id: raw.id,
        email,
        name,
        avatar_url,
    })
}
