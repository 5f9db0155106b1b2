use std::sync::Arc;

use async_trait::async_trait;

use crate::call::InboundCall;
use crate::error::AuthError;
use crate::guards::{DedicatedGuard, Guard, GuardOutcome, require_marker};
use crate::routes::RouteMetadata;
use crate::strategies::{AdminSecretVerifier, CUSTOM_TOKEN_HEADER};

/// Same shared secret as the admin guard, for machine-to-machine routes.
/// Fails with Unauthorized instead of Forbidden.
#[derive(Clone)]
pub struct CustomTokenGuard {
    verifier: Arc<dyn AdminSecretVerifier>,
}

impl CustomTokenGuard {
    pub fn new(verifier: Arc<dyn AdminSecretVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Guard for CustomTokenGuard {
    fn name(&self) -> &'static str {
        "custom_token"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        require_marker(route, DedicatedGuard::CustomToken)?;

        if self.verifier.verify(call.header(CUSTOM_TOKEN_HEADER)) {
            Ok(GuardOutcome::Authenticated)
        } else {
            tracing::warn!(route = %call.route(), "invalid custom token provided");
            Err(AuthError::unauthorized("Invalid token provided"))
        }
    }
}
