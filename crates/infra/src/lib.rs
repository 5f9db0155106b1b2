//! Infrastructure layer: config, identity storage, external services.

pub mod config;
pub mod external;
pub mod identity_store;

pub use config::{AppConfig, AuthConfig, ConfigError, GoogleOAuthConfig, JwtKeyConfig, ServerConfig};
pub use external::{GoogleOAuthClient, OAuthClientError};
pub use identity_store::InMemoryIdentityStore;
