//! Declarative per-route markers.
//!
//! Markers are attached at route registration time, at controller scope and/or
//! handler scope, and are read-only afterwards. They are advisory booleans: the
//! guards decide what a marker means and in which order markers are honoured.

use serde::Serialize;

/// One of the six declarative route markers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Public,
    AdminTokenRequired,
    CustomTokenRequired,
    GoogleAuth,
    PasskeyAuth,
    BypassTerms,
}

impl Marker {
    pub const ALL: [Marker; 6] = [
        Marker::Public,
        Marker::AdminTokenRequired,
        Marker::CustomTokenRequired,
        Marker::GoogleAuth,
        Marker::PasskeyAuth,
        Marker::BypassTerms,
    ];

    /// Markers that make the bearer-token resolver step aside, in precedence order.
    pub const SHORT_CIRCUIT_ORDER: [Marker; 5] = [
        Marker::Public,
        Marker::AdminTokenRequired,
        Marker::CustomTokenRequired,
        Marker::GoogleAuth,
        Marker::PasskeyAuth,
    ];

    /// Metadata key used when describing routes.
    pub fn key(&self) -> &'static str {
        match self {
            Marker::Public => "isPublic",
            Marker::AdminTokenRequired => "adminToken",
            Marker::CustomTokenRequired => "customToken",
            Marker::GoogleAuth => "isGoogle",
            Marker::PasskeyAuth => "isPasskey",
            Marker::BypassTerms => "isBypassTerms",
        }
    }

    fn index(self) -> usize {
        match self {
            Marker::Public => 0,
            Marker::AdminTokenRequired => 1,
            Marker::CustomTokenRequired => 2,
            Marker::GoogleAuth => 3,
            Marker::PasskeyAuth => 4,
            Marker::BypassTerms => 5,
        }
    }
}

impl core::fmt::Display for Marker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// Markers as declared at a single scope (controller or handler).
///
/// `None` means "not declared here", which is different from an explicit `false`:
/// a handler declaring `false` overrides a controller declaring `true`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MarkerDecl {
    values: [Option<bool>; 6],
}

impl MarkerDecl {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, marker: Marker, value: bool) -> Self {
        self.values[marker.index()] = Some(value);
        self
    }

    pub fn get(&self, marker: Marker) -> Option<bool> {
        self.values[marker.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Effective markers of one route after scope resolution.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSet {
    pub is_public: bool,
    pub is_admin_token_required: bool,
    pub is_custom_token_required: bool,
    pub is_google_auth: bool,
    pub is_passkey_auth: bool,
    pub is_bypass_terms: bool,
}

impl MarkerSet {
    /// Resolve the effective markers of a route: the handler-scope declaration
    /// wins, then the controller-scope one, then `false`.
    pub fn resolve(handler: &MarkerDecl, controller: &MarkerDecl) -> Self {
        let pick = |m: Marker| handler.get(m).or(controller.get(m)).unwrap_or(false);

        Self {
            is_public: pick(Marker::Public),
            is_admin_token_required: pick(Marker::AdminTokenRequired),
            is_custom_token_required: pick(Marker::CustomTokenRequired),
            is_google_auth: pick(Marker::GoogleAuth),
            is_passkey_auth: pick(Marker::PasskeyAuth),
            is_bypass_terms: pick(Marker::BypassTerms),
        }
    }

    pub fn is_set(&self, marker: Marker) -> bool {
        match marker {
            Marker::Public => self.is_public,
            Marker::AdminTokenRequired => self.is_admin_token_required,
            Marker::CustomTokenRequired => self.is_custom_token_required,
            Marker::GoogleAuth => self.is_google_auth,
            Marker::PasskeyAuth => self.is_passkey_auth,
            Marker::BypassTerms => self.is_bypass_terms,
        }
    }

    /// First marker, in precedence order, that exempts the route from bearer
    /// token resolution.
    pub fn short_circuit(&self) -> Option<Marker> {
        Marker::SHORT_CIRCUIT_ORDER
            .into_iter()
            .find(|m| self.is_set(*m))
    }
}
