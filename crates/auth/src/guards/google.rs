use std::sync::Arc;

use async_trait::async_trait;

use crate::call::{Authentication, InboundCall};
use crate::error::AuthError;
use crate::guards::{DedicatedGuard, Guard, GuardOutcome, require_marker};
use crate::routes::RouteMetadata;
use crate::strategies::{FederatedProfileSource, verify_federated_profile};

/// Query parameter carrying the provider's authorization code.
pub const CODE_PARAM: &str = "code";

/// Google OAuth callback guard.
#[derive(Clone, Default)]
pub struct GoogleAuthGuard {
    source: Option<Arc<dyn FederatedProfileSource>>,
}

impl GoogleAuthGuard {
    /// Guard without a provider: every check fails as unauthorized.
    pub fn unconfigured() -> Self {
        Self { source: None }
    }

    pub fn new(source: Arc<dyn FederatedProfileSource>) -> Self {
        Self { source: Some(source) }
    }
}

#[async_trait]
impl Guard for GoogleAuthGuard {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        require_marker(route, DedicatedGuard::Google)?;

        let source = self
            .source
            .as_ref()
            .ok_or_else(|| AuthError::unauthorized("federated login is not configured"))?;

        let code = call
            .query_param(CODE_PARAM)
            .ok_or_else(|| AuthError::unauthorized("missing authorization code"))?;

        let raw = source.fetch_profile(code).await.map_err(|e| {
            tracing::warn!(error = %e, "google profile exchange failed");
            AuthError::unauthorized("Google authentication failed")
        })?;

        let principal = verify_federated_profile(raw)?;
        tracing::debug!(provider_id = %principal.provider_id, "google profile verified");

        call.attach_authentication(Authentication::OAuth(principal))?;
        Ok(GuardOutcome::Authenticated)
    }
}
