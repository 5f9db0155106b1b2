//! Configuration loading and representation.
//!
//! Everything is read once at startup into an immutable [`AppConfig`] that is
//! then shared by reference.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use caregate_auth::strategies::JwtVerifier;
use caregate_observability::{LogConfig, LogFormat};

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_URL: &str = "http://localhost";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_ADMIN_ACCESS_TOKEN: &str = "admin_access_token";

const GOOGLE_CALLBACK_PATH: &str = "auth/sign-in/oauth/google/callback";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} is not a valid url: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("either AUTH_JWT_PUBLIC_KEY or AUTH_JWT_SECRET must be set")]
    MissingJwtKey,

    #[error("invalid JWT key: {0}")]
    InvalidJwtKey(String),

    #[error("invalid LOG_FORMAT: {0}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub url: String,
    pub api_version: String,
}

impl ServerConfig {
    /// Redirect target registered with Google.
    pub fn google_callback_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}:{}/api/{}/{}",
            self.url.trim_end_matches('/'),
            self.port,
            self.api_version,
            GOOGLE_CALLBACK_PATH
        );
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            var: "INFRA_URL",
            reason: e.to_string(),
        })
    }
}

/// Bearer token verification key.
#[derive(Debug, Clone)]
pub enum JwtKeyConfig {
    /// PEM encoded RSA public key (RS256).
    Rs256PublicKeyPem(Vec<u8>),
    /// Shared secret (HS256).
    Hs256Secret(SecretString),
}

impl JwtKeyConfig {
    pub fn verifier(&self) -> Result<JwtVerifier, ConfigError> {
        match self {
            JwtKeyConfig::Rs256PublicKeyPem(pem) => {
                JwtVerifier::rs256_pem(pem).map_err(|e| ConfigError::InvalidJwtKey(e.to_string()))
            }
            JwtKeyConfig::Hs256Secret(secret) => Ok(JwtVerifier::hs256(secret)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: Url,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtKeyConfig,
    pub admin_access_token: SecretString,
    /// `None` disables federated login.
    pub google: Option<GoogleOAuthConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("INFRA_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                var: "INFRA_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let server = ServerConfig {
            port,
            url: get("INFRA_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
            api_version: get("INFRA_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        };

        let jwt = match (get("AUTH_JWT_PUBLIC_KEY"), get("AUTH_JWT_SECRET")) {
            (Some(encoded), _) => {
                let pem = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| ConfigError::InvalidJwtKey(format!("AUTH_JWT_PUBLIC_KEY is not base64: {e}")))?;
                JwtKeyConfig::Rs256PublicKeyPem(pem)
            }
            (None, Some(secret)) => JwtKeyConfig::Hs256Secret(SecretString::from(secret)),
            (None, None) => return Err(ConfigError::MissingJwtKey),
        };

        let admin_access_token = match get("SECRET_ADMIN_ACCESS_TOKEN") {
            Some(token) => SecretString::from(token),
            None => {
                tracing::warn!("SECRET_ADMIN_ACCESS_TOKEN not set; using insecure default");
                SecretString::from(DEFAULT_ADMIN_ACCESS_TOKEN)
            }
        };

        let google = match (get("AUTH_GOOGLE_CLIENT_ID"), get("AUTH_GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret: SecretString::from(client_secret),
                callback_url: server.google_callback_url()?,
            }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("incomplete Google OAuth configuration; federated login disabled");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            server,
            auth: AuthConfig {
                jwt,
                admin_access_token,
                google,
            },
            log: Self::log_from_lookup(&lookup)?,
        })
    }

    /// Logging settings only, so the subscriber can be installed before the
    /// rest of the configuration is read (and warns).
    pub fn log_from_env() -> Result<LogConfig, ConfigError> {
        Self::log_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn log_from_lookup<F>(lookup: F) -> Result<LogConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup("LOG_FORMAT").filter(|v| !v.trim().is_empty()) {
            Some(value) => value
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidLogFormat(e.to_string()))?,
            None => LogFormat::default(),
        };

        Ok(LogConfig {
            format,
            default_filter: None,
        })
    }
}
