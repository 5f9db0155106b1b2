use serde::Serialize;
use thiserror::Error;

use caregate_core::SubjectId;

use crate::claims::TokenValidationError;

/// Which backing store an identity lookup was run against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Professionals,
    Responsables,
}

impl core::fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdentitySource::Professionals => f.write_str("professional"),
            IdentitySource::Responsables => f.write_str("responsable"),
        }
    }
}

/// Coarse classification of an [`AuthError`], used by transports to pick a
/// status code without inspecting the detailed reason.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No, invalid or expired credential.
    Unauthorized,
    /// Credential accepted but access refused.
    Forbidden,
    /// The credential verified but no identity backs its subject.
    IdentityNotFound,
}

/// Failure of any stage of the guard pipeline.
///
/// Reasons are meant for logs; transports must surface only [`ErrorKind`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid bearer token: {0}")]
    InvalidToken(#[from] TokenValidationError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{store} not found for subject {subject_id}")]
    IdentityNotFound {
        store: IdentitySource,
        subject_id: SubjectId,
    },
}

impl AuthError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Unauthorized(_) | AuthError::InvalidToken(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::IdentityNotFound { .. } => ErrorKind::IdentityNotFound,
        }
    }
}
