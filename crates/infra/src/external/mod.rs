//! External service clients/adapters.

pub mod google;

pub use google::{GoogleEndpoints, GoogleOAuthClient, GoogleUserInfo, OAuthClientError};
