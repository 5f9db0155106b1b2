//! Default guard: bearer token resolution and identity hydration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::call::{Authentication, InboundCall};
use crate::claims::{JwtPrincipal, TokenValidationError};
use crate::error::AuthError;
use crate::guards::{Guard, GuardOutcome};
use crate::identity::{HydrationRequest, IdentityHydrator};
use crate::routes::RouteMetadata;
use crate::strategies::BearerTokenVerifier;

#[derive(Debug)]
enum State {
    Start,
    MarkerCheck,
    StrategyVerify,
    IdentityHydrate(JwtPrincipal),
    Allow(GuardOutcome),
}

/// Runs on every route. Steps aside for routes carrying a short-circuit
/// marker; otherwise demands a valid bearer token and hydrates the caller.
#[derive(Clone)]
pub struct JwtAuthenticateGuard {
    verifier: Arc<dyn BearerTokenVerifier>,
    hydrator: Arc<dyn IdentityHydrator>,
}

impl JwtAuthenticateGuard {
    pub fn new(verifier: Arc<dyn BearerTokenVerifier>, hydrator: Arc<dyn IdentityHydrator>) -> Self {
        Self { verifier, hydrator }
    }

    pub async fn resolve(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        let mut state = State::Start;

        loop {
            tracing::trace!(?state, "resolver step");
            state = match state {
                State::Start => State::MarkerCheck,

                State::MarkerCheck => match route.markers.short_circuit() {
                    Some(marker) => {
                        tracing::debug!(%marker, "bearer token not required");
                        State::Allow(GuardOutcome::Bypassed(marker))
                    }
                    None => State::StrategyVerify,
                },

                State::StrategyVerify => {
                    let token = call.bearer_token().ok_or(TokenValidationError::Missing)?;
                    let principal = self.verifier.verify(token).inspect_err(|e| {
                        tracing::debug!(error = %e, "bearer token rejected");
                    })?;

                    call.attach_authentication(Authentication::Jwt(principal.clone()))?;
                    State::IdentityHydrate(principal)
                }

                State::IdentityHydrate(principal) => {
                    let identity = self
                        .hydrator
                        .hydrate(HydrationRequest {
                            subject_id: principal.sub,
                            user_type: principal.user_type,
                            bypass_terms: route.markers.is_bypass_terms,
                        })
                        .await?;

                    call.attach_current_user(identity)?;
                    State::Allow(GuardOutcome::Authenticated)
                }

                State::Allow(outcome) => return Ok(outcome),
            };
        }
    }
}

#[async_trait]
impl Guard for JwtAuthenticateGuard {
    fn name(&self) -> &'static str {
        "jwt"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        self.resolve(call, route).await
    }
}
