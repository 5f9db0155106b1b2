use std::sync::Arc;

use async_trait::async_trait;

use crate::call::{Authentication, InboundCall};
use crate::error::AuthError;
use crate::guards::{DedicatedGuard, Guard, GuardOutcome, require_marker};
use crate::routes::RouteMetadata;
use crate::strategies::{PassThroughPasskeyVerifier, PasskeyPayload, PasskeyVerifier};

#[derive(Clone)]
pub struct PasskeyGuard {
    verifier: Arc<dyn PasskeyVerifier>,
}

impl PasskeyGuard {
    pub fn new(verifier: Arc<dyn PasskeyVerifier>) -> Self {
        Self { verifier }
    }
}

impl Default for PasskeyGuard {
    fn default() -> Self {
        Self::new(Arc::new(PassThroughPasskeyVerifier))
    }
}

#[async_trait]
impl Guard for PasskeyGuard {
    fn name(&self) -> &'static str {
        "passkey"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        require_marker(route, DedicatedGuard::Passkey)?;

        let payload = call
            .body()
            .cloned()
            .map(PasskeyPayload)
            .unwrap_or_else(PasskeyPayload::empty);

        let verified = self.verifier.verify(payload).await?;
        call.attach_authentication(Authentication::Passkey(verified))?;
        Ok(GuardOutcome::Authenticated)
    }
}
