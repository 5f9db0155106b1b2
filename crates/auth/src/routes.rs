//! Route registration: markers, explicit guards and policies per route.
//!
//! Routes are registered once at startup into a [`RouteTable`] that is
//! read-only afterwards and looked up by [`RouteId`] on every call.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::guards::DedicatedGuard;
use crate::markers::{Marker, MarkerDecl, MarkerSet};
use crate::policy::PolicyHandler;

/// Identity of a route: upper-cased method plus path pattern (`"GET /patients/:id"`).
///
/// `HEAD` is folded into `GET`, since a `HEAD` request is served by the `GET` handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId {
    method: String,
    path: String,
}

impl RouteId {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        let mut method = method.as_ref().to_ascii_uppercase();
        if method == "HEAD" {
            method = String::from("GET");
        }
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl core::fmt::Display for RouteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

macro_rules! marker_setters {
    ($ty:ident, $field:ident) => {
        impl $ty {
            /// Route needs no credential at all.
            #[must_use]
            pub fn public(self) -> Self {
                self.marker(Marker::Public, true)
            }

            #[must_use]
            pub fn admin_token(self) -> Self {
                self.marker(Marker::AdminTokenRequired, true)
            }

            #[must_use]
            pub fn custom_token(self) -> Self {
                self.marker(Marker::CustomTokenRequired, true)
            }

            #[must_use]
            pub fn google_auth(self) -> Self {
                self.marker(Marker::GoogleAuth, true)
            }

            #[must_use]
            pub fn passkey_auth(self) -> Self {
                self.marker(Marker::PasskeyAuth, true)
            }

            #[must_use]
            pub fn bypass_terms(self) -> Self {
                self.marker(Marker::BypassTerms, true)
            }

            /// Declare a marker explicitly, `false` included.
            #[must_use]
            pub fn marker(mut self, marker: Marker, value: bool) -> Self {
                self.$field = self.$field.with(marker, value);
                self
            }

            /// Attach a dedicated guard regardless of markers.
            #[must_use]
            pub fn guarded_by(mut self, guard: DedicatedGuard) -> Self {
                self.guards.push(guard);
                self
            }
        }
    };
}

/// Handler-scope registration of one route.
pub struct RouteDef {
    id: RouteId,
    markers: MarkerDecl,
    guards: Vec<DedicatedGuard>,
    policies: Option<Vec<Arc<dyn PolicyHandler>>>,
}

impl RouteDef {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            id: RouteId::new(method, path),
            markers: MarkerDecl::new(),
            guards: Vec::new(),
            policies: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new("PUT", path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new("PATCH", path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    /// Add a policy predicate. Handler-scope policies replace controller ones.
    #[must_use]
    pub fn check_policy(mut self, policy: impl PolicyHandler + 'static) -> Self {
        self.policies.get_or_insert_with(Vec::new).push(Arc::new(policy));
        self
    }
}

marker_setters!(RouteDef, markers);

/// Class-scope registration: markers and policies shared by a group of routes.
#[derive(Default)]
pub struct Controller {
    markers: MarkerDecl,
    guards: Vec<DedicatedGuard>,
    policies: Vec<Arc<dyn PolicyHandler>>,
    routes: Vec<RouteDef>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn check_policy(mut self, policy: impl PolicyHandler + 'static) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    #[must_use]
    pub fn route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }
}

marker_setters!(Controller, markers);

/// Everything the pipeline needs to know about one route.
#[derive(Clone, Default)]
pub struct RouteMetadata {
    pub markers: MarkerSet,
    /// Guards attached explicitly with `guarded_by`.
    pub guards: Vec<DedicatedGuard>,
    pub policies: Vec<Arc<dyn PolicyHandler>>,
}

impl RouteMetadata {
    /// Dedicated guards to run for this route, de-duplicated, in pipeline order.
    ///
    /// A guard runs when its marker is set or when it was attached explicitly.
    pub fn dedicated_guards(&self) -> Vec<DedicatedGuard> {
        DedicatedGuard::ALL
            .into_iter()
            .filter(|g| self.markers.is_set(g.marker()) || self.guards.contains(g))
            .collect()
    }
}

impl core::fmt::Debug for RouteMetadata {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RouteMetadata")
            .field("markers", &self.markers)
            .field("guards", &self.guards)
            .field("policies", &self.policies.len())
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route registered twice: {0}")]
    Duplicate(RouteId),
}

/// Read-only registry of route metadata.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<RouteId, Arc<RouteMetadata>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the markers of every route of `controller` and register them.
    pub fn register(&mut self, controller: Controller) -> Result<(), RouteTableError> {
        let Controller {
            markers: controller_markers,
            guards: controller_guards,
            policies: controller_policies,
            routes,
        } = controller;

        for route in routes {
            if self.routes.contains_key(&route.id) {
                return Err(RouteTableError::Duplicate(route.id));
            }

            let mut guards = controller_guards.clone();
            guards.extend(route.guards);

            let metadata = RouteMetadata {
                markers: MarkerSet::resolve(&route.markers, &controller_markers),
                guards,
                policies: route.policies.unwrap_or_else(|| controller_policies.clone()),
            };

            tracing::debug!(route = %route.id, markers = ?metadata.markers, "route registered");
            self.routes.insert(route.id, Arc::new(metadata));
        }

        Ok(())
    }

    /// Metadata of a registered route. Callers must deny unknown routes.
    pub fn lookup(&self, id: &RouteId) -> Option<Arc<RouteMetadata>> {
        self.routes.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RouteId> {
        self.routes.keys()
    }
}
