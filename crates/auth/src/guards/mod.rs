//! Guards: one decision each, composed by [`crate::pipeline::GuardPipeline`].

use async_trait::async_trait;
use serde::Serialize;

use crate::call::InboundCall;
use crate::error::AuthError;
use crate::markers::Marker;
use crate::routes::RouteMetadata;

pub mod admin_token;
pub mod custom_token;
pub mod google;
pub mod passkey;
pub mod resolver;

pub use admin_token::AdminTokenGuard;
pub use custom_token::CustomTokenGuard;
pub use google::GoogleAuthGuard;
pub use passkey::PasskeyGuard;
pub use resolver::JwtAuthenticateGuard;

/// Successful outcome of a guard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardOutcome {
    /// The guard stepped aside because of a marker; another guard (or none) is in charge.
    Bypassed(Marker),
    /// The guard verified a credential.
    Authenticated,
}

#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, call: &mut InboundCall, route: &RouteMetadata) -> Result<GuardOutcome, AuthError>;
}

/// Single-strategy guards a route can demand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedicatedGuard {
    AdminToken,
    CustomToken,
    Google,
    Passkey,
}

impl DedicatedGuard {
    /// Pipeline order.
    pub const ALL: [DedicatedGuard; 4] = [
        DedicatedGuard::AdminToken,
        DedicatedGuard::CustomToken,
        DedicatedGuard::Google,
        DedicatedGuard::Passkey,
    ];

    /// Marker the guard requires before it verifies anything.
    pub fn marker(&self) -> Marker {
        match self {
            DedicatedGuard::AdminToken => Marker::AdminTokenRequired,
            DedicatedGuard::CustomToken => Marker::CustomTokenRequired,
            DedicatedGuard::Google => Marker::GoogleAuth,
            DedicatedGuard::Passkey => Marker::PasskeyAuth,
        }
    }
}

/// Marker check shared by the dedicated guards.
pub(crate) fn require_marker(route: &RouteMetadata, guard: DedicatedGuard) -> Result<(), AuthError> {
    let marker = guard.marker();
    if route.markers.is_set(marker) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!("{guard:?} guard requires the {marker} marker")))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::markers::MarkerSet;
    use crate::routes::RouteMetadata;

    pub fn route(markers: MarkerSet) -> RouteMetadata {
        RouteMetadata {
            markers,
            ..RouteMetadata::default()
        }
    }
}
