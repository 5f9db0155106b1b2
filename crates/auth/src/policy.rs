//! Fine-grained policy checks run after identity resolution.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ability::{Ability, AbilityFactory};
use crate::call::InboundCall;
use crate::error::AuthError;
use crate::guards::{Guard, GuardOutcome};
use crate::permissions::{Action, Resource};
use crate::routes::RouteMetadata;

/// A pure predicate over a caller's [`Ability`].
///
/// Closures `Fn(&Ability) -> bool` are handlers too, so routes can mix
/// handler objects and plain functions.
pub trait PolicyHandler: Send + Sync {
    fn handle(&self, ability: &Ability) -> bool;
}

impl<F> PolicyHandler for F
where
    F: Fn(&Ability) -> bool + Send + Sync,
{
    fn handle(&self, ability: &Ability) -> bool {
        self(ability)
    }
}

/// Policy requiring a single `(action, resource)` grant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequireAbility {
    pub action: Action,
    pub resource: Resource,
}

impl PolicyHandler for RequireAbility {
    fn handle(&self, ability: &Ability) -> bool {
        ability.can(self.action, &self.resource)
    }
}

pub fn can(action: Action, resource: Resource) -> RequireAbility {
    RequireAbility { action, resource }
}

/// Runs the route's policy predicates against the current user's ability.
#[derive(Debug, Clone, Default)]
pub struct PoliciesGuard {
    factory: AbilityFactory,
}

impl PoliciesGuard {
    pub fn new(factory: AbilityFactory) -> Self {
        Self { factory }
    }

    /// No policies: allowed. Otherwise a current user is required and every
    /// predicate must hold.
    pub fn evaluate(&self, call: &InboundCall, policies: &[Arc<dyn PolicyHandler>]) -> Result<(), AuthError> {
        if policies.is_empty() {
            return Ok(());
        }

        let identity = call
            .current_user()
            .ok_or_else(|| AuthError::forbidden("policy check requires an authenticated user"))?;

        let ability = self.factory.build(&identity.permissions);

        match policies.iter().position(|p| !p.handle(&ability)) {
            None => Ok(()),
            Some(index) => {
                tracing::warn!(subject_id = %identity.id, policy = index, "policy predicate denied the call");
                Err(AuthError::forbidden(format!("policy #{index} denied")))
            }
        }
    }
}

#[async_trait]
impl Guard for PoliciesGuard {
    fn name(&self) -> &'static str {
        "policies"
    }

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError> {
        self.evaluate(call, &route.policies)?;
        Ok(GuardOutcome::Authenticated)
    }
}
