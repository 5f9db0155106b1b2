use std::sync::Arc;

use async_trait::async_trait;

use crate::call::InboundCall;
use crate::error::AuthError;
use crate::guards::{DedicatedGuard, Guard, GuardOutcome, require_marker};
use crate::routes::RouteMetadata;
use crate::strategies::{AdminSecretVerifier, CUSTOM_TOKEN_HEADER};

/// Admin shared-secret guard. Any failure is Forbidden with one generic reason.
#[derive(Clone)]
pub struct AdminTokenGuard {
    verifier: Arc<dyn AdminSecretVerifier>,
}

impl AdminTokenGuard {
    pub fn new(verifier: Arc<dyn AdminSecretVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Guard for AdminTokenGuard {
    fn name(&self) -> &'static str {
        "admin_token"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        require_marker(route, DedicatedGuard::AdminToken)?;

        if self.verifier.verify(call.header(CUSTOM_TOKEN_HEADER)) {
            Ok(GuardOutcome::Authenticated)
        } else {
            tracing::warn!(route = %call.route(), "invalid admin token provided");
            Err(AuthError::forbidden("Invalid token provided"))
        }
    }
}
