//! Ordered composition of the guards run before every handler.

use std::sync::Arc;

use tracing::Instrument;

use crate::call::InboundCall;
use crate::error::AuthError;
use crate::guards::{
    AdminTokenGuard, CustomTokenGuard, DedicatedGuard, GoogleAuthGuard, Guard, JwtAuthenticateGuard, PasskeyGuard,
};
use crate::identity::IdentityHydrator;
use crate::policy::PoliciesGuard;
use crate::routes::RouteMetadata;
use crate::strategies::{AdminSecretVerifier, BearerTokenVerifier, FederatedProfileSource, PasskeyVerifier};

/// Bearer-token resolver, then the route's dedicated guards, then policies.
/// The first failing guard ends the call.
#[derive(Clone)]
pub struct GuardPipeline {
    resolver: JwtAuthenticateGuard,
    admin_token: AdminTokenGuard,
    custom_token: CustomTokenGuard,
    google: GoogleAuthGuard,
    passkey: PasskeyGuard,
    policies: PoliciesGuard,
}

impl GuardPipeline {
    pub fn new(
        bearer: Arc<dyn BearerTokenVerifier>,
        hydrator: Arc<dyn IdentityHydrator>,
        admin_secret: Arc<dyn AdminSecretVerifier>,
    ) -> Self {
        Self {
            resolver: JwtAuthenticateGuard::new(bearer, hydrator),
            admin_token: AdminTokenGuard::new(admin_secret.clone()),
            custom_token: CustomTokenGuard::new(admin_secret),
            google: GoogleAuthGuard::unconfigured(),
            passkey: PasskeyGuard::default(),
            policies: PoliciesGuard::default(),
        }
    }

    #[must_use]
    pub fn with_google(mut self, source: Arc<dyn FederatedProfileSource>) -> Self {
        self.google = GoogleAuthGuard::new(source);
        self
    }

    #[must_use]
    pub fn with_passkey(mut self, verifier: Arc<dyn PasskeyVerifier>) -> Self {
        self.passkey = PasskeyGuard::new(verifier);
        self
    }

    fn dedicated(&self, guard: DedicatedGuard) -> &dyn Guard {
        match guard {
            DedicatedGuard::AdminToken => &self.admin_token,
            DedicatedGuard::CustomToken => &self.custom_token,
            DedicatedGuard::Google => &self.google,
            DedicatedGuard::Passkey => &self.passkey,
        }
    }

    pub async fn run(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<(), AuthError> {
        let span = tracing::info_span!("guards", route = %call.route());

        async {
            let mut chain: Vec<&dyn Guard> = vec![&self.resolver];
            chain.extend(route.dedicated_guards().into_iter().map(|g| self.dedicated(g)));
            chain.push(&self.policies);

            for guard in chain {
                match guard.check(call, route).await {
                    Ok(outcome) => tracing::debug!(guard = guard.name(), ?outcome, "guard passed"),
                    Err(e) => {
                        tracing::warn!(guard = guard.name(), error = %e, kind = ?e.kind(), "call denied");
                        return Err(e);
                    }
                }
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::identity::testing::{MemoryProfiles, hydrator};
    use crate::identity::ProfessionalType;
    use crate::markers::{Marker, MarkerDecl, MarkerSet};
    use crate::permissions::{Action, Resource};
    use crate::policy::{PolicyHandler, can};
    use crate::routes::RouteId;
    use crate::strategies::{CUSTOM_TOKEN_HEADER, JwtVerifier, StaticAdminSecret};
    use caregate_core::SubjectId;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use secrecy::SecretString;

    use crate::claims::TokenClaims;

    const SECRET: &str = "pipeline-secret";

    fn pipeline(profiles: MemoryProfiles) -> GuardPipeline {
        GuardPipeline::new(
            Arc::new(JwtVerifier::hs256(&SecretString::from(SECRET))),
            Arc::new(hydrator(profiles)),
            Arc::new(StaticAdminSecret::new(SecretString::from("abc"))),
        )
    }

    fn token(sub: SubjectId) -> String {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: sub.to_string(),
            user_type: None,
            iat: Some(now),
            exp: now + 600,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn policy_route(policy: impl PolicyHandler + 'static) -> RouteMetadata {
        RouteMetadata {
            policies: vec![Arc::new(policy)],
            ..RouteMetadata::default()
        }
    }

    #[tokio::test]
    async fn admin_route_is_verified_by_its_own_guard() {
        let p = pipeline(MemoryProfiles::default());
        let route = RouteMetadata {
            markers: MarkerSet::resolve(&MarkerDecl::new(), &MarkerDecl::new().with(Marker::AdminTokenRequired, true)),
            ..RouteMetadata::default()
        };

        let mut ok = InboundCall::new(RouteId::new("GET", "/admin/configs")).with_header(CUSTOM_TOKEN_HEADER, "abc");
        p.run(&mut ok, &route).await.unwrap();
        assert!(ok.current_user().is_none());

        let mut bad = InboundCall::new(RouteId::new("GET", "/admin/configs")).with_header(CUSTOM_TOKEN_HEADER, "xyz");
        assert_eq!(p.run(&mut bad, &route).await.unwrap_err().kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn policy_passes_for_permitted_professional() {
        let id = SubjectId::new();
        let p = pipeline(MemoryProfiles::default().with_professional(id, ProfessionalType::Psychologist, false));
        let mut call =
            InboundCall::new(RouteId::new("GET", "/patients")).with_header("authorization", format!("Bearer {}", token(id)));

        p.run(&mut call, &policy_route(can(Action::Read, Resource::Patients))).await.unwrap();
        assert!(call.current_user().is_some());
    }

    #[tokio::test]
    async fn policy_denial_is_forbidden() {
        let id = SubjectId::new();
        let p = pipeline(MemoryProfiles::default().with_professional(id, ProfessionalType::Psychologist, false));
        let mut call = InboundCall::new(RouteId::new("GET", "/nutritionists"))
            .with_header("authorization", format!("Bearer {}", token(id)));

        let err = p
            .run(&mut call, &policy_route(can(Action::Read, Resource::Nutritionists)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn public_route_with_policy_is_forbidden_without_identity() {
        let p = pipeline(MemoryProfiles::default());
        let route = RouteMetadata {
            markers: MarkerSet {
                is_public: true,
                ..MarkerSet::default()
            },
            ..policy_route(can(Action::Read, Resource::Patients))
        };
        let err = p
            .run(&mut InboundCall::new(RouteId::new("GET", "/x")), &route)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn explicitly_attached_guard_without_marker_denies() {
        let id = SubjectId::new();
        let p = pipeline(MemoryProfiles::default().with_professional(id, ProfessionalType::Secretary, false));
        let route = RouteMetadata {
            guards: vec![DedicatedGuard::Passkey],
            ..RouteMetadata::default()
        };
        let mut call = InboundCall::new(RouteId::new("POST", "/x")).with_header("authorization", format!("Bearer {}", token(id)));
        let err = p.run(&mut call, &route).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
