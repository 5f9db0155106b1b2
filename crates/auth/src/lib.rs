//! `caregate-auth`: route guards, identity resolution and permission abilities.
//!
//! Nothing here depends on HTTP or storage: transports
//! build an [`InboundCall`], run the [`GuardPipeline`] and read the filled
//! identity slots back.

pub mod ability;
pub mod call;
pub mod claims;
pub mod defaults;
pub mod error;
pub mod explain;
pub mod guards;
pub mod identity;
pub mod markers;
pub mod permissions;
pub mod pipeline;
pub mod policy;
pub mod routes;
pub mod strategies;

pub use ability::{Ability, AbilityFactory, Rule, Subject};
pub use call::{Authentication, InboundCall};
pub use claims::{JwtPrincipal, TokenClaims, TokenValidationError, validate_claims};
pub use defaults::DefaultPermissions;
pub use error::{AuthError, ErrorKind, IdentitySource};
pub use explain::{AbilityExplanation, explain};
pub use guards::{DedicatedGuard, Guard, GuardOutcome};
pub use identity::{
    CallerIdentity, HydrationRequest, IdentityHydrator, PermissionSource, ProfessionalRecord, ProfessionalStore,
    ProfessionalType, Profile, ResponsableRecord, ResponsableStore, StoreIdentityHydrator, UserType,
};
pub use markers::{Marker, MarkerDecl, MarkerSet};
pub use permissions::{Action, Permission, PermissionParseError, Resource};
pub use pipeline::GuardPipeline;
pub use policy::{PoliciesGuard, PolicyHandler, RequireAbility, can};
pub use routes::{Controller, RouteDef, RouteId, RouteMetadata, RouteTable, RouteTableError};
