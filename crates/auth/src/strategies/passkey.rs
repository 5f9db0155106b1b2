use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::AuthError;

/// Passkey credential payload, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PasskeyPayload(pub Value);

impl PasskeyPayload {
    pub fn empty() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }
}

#[async_trait]
pub trait PasskeyVerifier: Send + Sync {
    async fn verify(&self, payload: PasskeyPayload) -> Result<PasskeyPayload, AuthError>;
}

/// Accepts any payload unchanged. Stands in until a WebAuthn verifier exists.
#[derive(Debug, Copy, Clone, Default)]
pub struct PassThroughPasskeyVerifier;

#[async_trait]
impl PasskeyVerifier for PassThroughPasskeyVerifier {
    async fn verify(&self, payload: PasskeyPayload) -> Result<PasskeyPayload, AuthError> {
        tracing::debug!(payload = %payload.0, "passkey payload accepted without verification");
        Ok(payload)
    }
}
