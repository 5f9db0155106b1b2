//! Ability objects: `can(action, subject)` evaluation for one caller.
//!
//! An [`Ability`] is built once per authorized call from the caller's flat
//! permission list and is immutable afterwards. Nothing is cached across calls:
//! permissions may change between two calls of the same identity.

use serde::Serialize;

use crate::permissions::{Action, Permission, Resource, WILDCARD_PERMISSION};

/// Business rules applied while turning permission strings into grants.
pub mod rules {
    use super::{Action, Resource, Rule, WILDCARD_PERMISSION};

    /// The literal `"all"` entry supersedes every other entry.
    pub fn grants_everything<S: AsRef<str>>(permissions: &[S]) -> bool {
        permissions.iter().any(|p| p.as_ref() == WILDCARD_PERMISSION)
    }

    /// Grant produced by the `"all"` entry.
    pub const EVERYTHING: Rule = Rule {
        action: Action::Manage,
        resource: Resource::All,
    };

    /// Actions granted by a declared action: `write` implies `read`.
    pub fn implied_actions(action: Action) -> &'static [Action] {
        match action {
            Action::Write => &[Action::Write, Action::Read],
            Action::Manage => &[Action::Manage],
            Action::Read => &[Action::Read],
            Action::Delete => &[Action::Delete],
        }
    }
}

/// A single grant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    pub action: Action,
    pub resource: Resource,
}

impl Rule {
    /// `manage` matches any action and `all` matches any resource. Asking about
    /// `all` itself only matches grants on `all`.
    pub fn matches(&self, action: Action, resource: Resource) -> bool {
        let action_ok = self.action == Action::Manage || self.action == action;
        let resource_ok = self.resource == Resource::All || self.resource == resource;
        action_ok && resource_ok
    }
}

impl core::fmt::Display for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// Anything a permission check can be asked about.
///
/// Domain objects implement this to report their catalog entry; bare resource
/// tags (`"patients"`) and [`Resource`] values resolve to the same entry.
pub trait Subject {
    /// Catalog entry of the subject, `None` when it is not in the catalog.
    fn subject_type(&self) -> Option<Resource>;
}

impl Subject for Resource {
    fn subject_type(&self) -> Option<Resource> {
        Some(*self)
    }
}

impl Subject for str {
    fn subject_type(&self) -> Option<Resource> {
        self.parse().ok()
    }
}

impl Subject for String {
    fn subject_type(&self) -> Option<Resource> {
        self.as_str().subject_type()
    }
}

/// Immutable permission-evaluation structure for one caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    pub fn can<S: Subject + ?Sized>(&self, action: Action, subject: &S) -> bool {
        self.matching_rule(action, subject).is_some()
    }

    pub fn cannot<S: Subject + ?Sized>(&self, action: Action, subject: &S) -> bool {
        !self.can(action, subject)
    }

    /// First grant that allows `action` on `subject`.
    pub fn matching_rule<S: Subject + ?Sized>(&self, action: Action, subject: &S) -> Option<&Rule> {
        let resource = subject.subject_type()?;
        self.rules.iter().find(|r| r.matches(action, resource))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Builds [`Ability`] objects from permission strings.
#[derive(Debug, Copy, Clone, Default)]
pub struct AbilityFactory;

impl AbilityFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build an ability from a caller's permission list.
    ///
    /// Entries that do not parse into the catalog are skipped (and logged).
    /// Redundant grants are kept; they are harmless.
    pub fn build<S: AsRef<str>>(&self, permissions: &[S]) -> Ability {
        if rules::grants_everything(permissions) {
            return Ability {
                rules: vec![rules::EVERYTHING],
            };
        }

        let mut granted = Vec::with_capacity(permissions.len());
        for entry in permissions {
            let entry = entry.as_ref();
            match entry.parse::<Permission>() {
                Ok(permission) => {
                    granted.extend(rules::implied_actions(permission.action).iter().map(|action| Rule {
                        action: *action,
                        resource: permission.resource,
                    }));
                }
                Err(e) => {
                    tracing::warn!(permission = entry, error = %e, "skipping unusable permission entry");
                }
            }
        }

        Ability { rules: granted }
    }
}
