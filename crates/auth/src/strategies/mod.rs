//! Credential verifiers, one per authentication strategy.
//!
//! Each verifier validates a credential and yields a raw principal; none of
//! them touches identity storage.

pub mod admin_token;
pub mod jwt;
pub mod oauth;
pub mod passkey;

pub use admin_token::{AdminSecretVerifier, CUSTOM_TOKEN_HEADER, StaticAdminSecret};
pub use jwt::{BearerTokenVerifier, JwtVerifier};
pub use oauth::{
    FederatedProfileSource, FederationError, OAuthPrincipal, ProfileName, ProfileValue, Provider, RawFederatedProfile,
    verify_federated_profile,
};
pub use passkey::{PassThroughPasskeyVerifier, PasskeyPayload, PasskeyVerifier};
