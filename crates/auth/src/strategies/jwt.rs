//! Bearer token (JWT) verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};

use crate::claims::{JwtPrincipal, TokenClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and extracts its raw principal.
pub trait BearerTokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<JwtPrincipal, TokenValidationError>;
}

/// Signature check with `jsonwebtoken`, then time-window and subject checks
/// with [`validate_claims`].
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Shared-secret verifier (HS256).
    pub fn hs256(secret: &SecretString) -> Self {
        Self::with_key(DecodingKey::from_secret(secret.expose_secret().as_bytes()), Algorithm::HS256)
    }

    /// Public-key verifier (RS256) from a PEM encoded RSA public key.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::with_key(DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // exp/iat are checked by validate_claims against a single clock reading.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self { key, validation }
    }
}

impl core::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl BearerTokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<JwtPrincipal, TokenValidationError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenValidationError::BadSignature,
            ErrorKind::ExpiredSignature => TokenValidationError::Expired,
            _ => TokenValidationError::Malformed(e.to_string()),
        })?;

        validate_claims(&data.claims, Utc::now())
    }
}
