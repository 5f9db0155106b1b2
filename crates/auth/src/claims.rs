use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use caregate_core::SubjectId;

use crate::identity::UserType;

/// Bearer token claims as they travel on the wire.
///
/// Signature verification happens before these are looked at (see
/// [`crate::strategies::jwt`]); [`validate_claims`] only checks their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier (must be a UUID).
    pub sub: String,

    #[serde(rename = "userType", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,

    /// Issued-at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

/// Raw principal produced by the bearer-token strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtPrincipal {
    pub sub: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("no bearer token supplied")]
    Missing,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("subject is not a valid identifier: {0}")]
    InvalidSubject(String),
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenValidationError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenValidationError::Malformed(format!("timestamp out of range: {secs}")))
}

/// Deterministically validate decoded claims and extract the raw principal.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<JwtPrincipal, TokenValidationError> {
    let expires_at = timestamp(claims.exp)?;

    if let Some(iat) = claims.iat {
        let issued_at = timestamp(iat)?;
        if expires_at <= issued_at {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
        if now < issued_at {
            return Err(TokenValidationError::NotYetValid);
        }
    }

    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }

    let sub = claims
        .sub
        .parse::<SubjectId>()
        .map_err(|e| TokenValidationError::InvalidSubject(e.to_string()))?;

    Ok(JwtPrincipal {
        sub,
        user_type: claims.user_type,
    })
}
