use secrecy::{ExposeSecret, SecretString};

/// Header carrying the admin shared secret.
pub const CUSTOM_TOKEN_HEADER: &str = "x-custom-token";

/// Checks a presented shared secret against the configured one.
pub trait AdminSecretVerifier: Send + Sync {
    /// `None` (header absent) never verifies.
    fn verify(&self, presented: Option<&str>) -> bool;

    fn configured_secret(&self) -> &SecretString;
}

/// Secret loaded once at startup.
#[derive(Debug, Clone)]
pub struct StaticAdminSecret {
    secret: SecretString,
}

impl StaticAdminSecret {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }
}

impl AdminSecretVerifier for StaticAdminSecret {
    fn verify(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(value) => value == self.secret.expose_secret(),
            None => false,
        }
    }

    fn configured_secret(&self) -> &SecretString {
        &self.secret
    }
}
