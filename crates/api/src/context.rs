//! Request extractors for what the guards attached to a request.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use caregate_auth::{Authentication, CallerIdentity};

use crate::app::errors::json_error;

/// Hydrated caller of a bearer-token route.
///
/// Only valid on routes that went through identity hydration; anywhere else
/// the request is answered with a 500.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub CallerIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                tracing::error!(path = %parts.uri.path(), "handler expects a current user but none was attached");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            })
    }
}

/// Raw principal attached by the strategy that authenticated the request.
#[derive(Debug, Clone)]
pub struct CurrentAuthentication(pub Option<Authentication>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentAuthentication
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Authentication>().cloned()))
    }
}

/// Per-request audit context.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub log_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub authentication: Option<Authentication>,
    pub user: Option<CallerIdentity>,
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = header(parts, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|first| first.trim().to_string()))
            .filter(|v| !v.is_empty())
            .or_else(|| header(parts, "x-real-ip"));

        Ok(Self {
            log_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            ip,
            user_agent: header(parts, "user-agent"),
            authentication: parts.extensions.get::<Authentication>().cloned(),
            user: parts.extensions.get::<CallerIdentity>().cloned(),
        })
    }
}
