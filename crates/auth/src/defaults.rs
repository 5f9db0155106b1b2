//! Default user-type → permission table.

use crate::identity::{CallerIdentity, PermissionSource, UserType};
use crate::permissions::WILDCARD_PERMISSION;

const PROFESSIONAL_BASE: &[&str] = &[
    "addresses:manage",
    "agendas:manage",
    "careAssignments:manage",
    "customizations:manage",
    "financials:manage",
    "foods:manage",
    "patients:manage",
    "resources:manage",
    "secretaries:manage",
];

const RESPONSABLE: &[&str] = &[
    "responsables:manage",
    "patients:manage",
    "careAssignments:manage",
    "resources:read",
];

const SECRETARY: &[&str] = &[
    "secretaries:manage",
    "responsables:manage",
    "agendas:manage",
    "patients:manage",
    "careAssignments:manage",
    "financials:manage",
];

/// Static permission source: admins get the wildcard, everyone else the
/// defaults of their user type.
#[derive(Debug, Copy, Clone, Default)]
pub struct DefaultPermissions;

impl DefaultPermissions {
    pub fn new() -> Self {
        Self
    }

    pub fn for_user_type(user_type: UserType) -> Vec<String> {
        let owned = |list: &[&str]| list.iter().map(|p| (*p).to_string()).collect::<Vec<_>>();

        match user_type {
            UserType::Nutritionist => {
                let mut perms = vec!["nutritionists:manage".to_string()];
                perms.extend(owned(PROFESSIONAL_BASE));
                perms
            }
            UserType::OccupationalTherapist | UserType::Psychologist | UserType::SpeechTherapist => {
                owned(PROFESSIONAL_BASE)
            }
            UserType::Patient => vec!["patients:manage".to_string()],
            UserType::Responsable => owned(RESPONSABLE),
            UserType::Secretary => owned(SECRETARY),
        }
    }
}

impl PermissionSource for DefaultPermissions {
    fn permissions_for(&self, identity: &CallerIdentity) -> Vec<String> {
        if identity.is_admin {
            return vec![WILDCARD_PERMISSION.to_string()];
        }
        Self::for_user_type(identity.user_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityFactory;
    use crate::permissions::{Action, Permission, Resource};

    #[test]
    fn every_default_entry_is_in_the_catalog() {
        for user_type in [
            UserType::Nutritionist,
            UserType::OccupationalTherapist,
            UserType::Psychologist,
            UserType::SpeechTherapist,
            UserType::Secretary,
            UserType::Patient,
            UserType::Responsable,
        ] {
            for entry in DefaultPermissions::for_user_type(user_type) {
                assert!(entry.parse::<Permission>().is_ok(), "{user_type:?}: {entry}");
            }
        }
    }

    #[test]
    fn responsable_can_only_read_resources() {
        let ability = AbilityFactory::new().build(&DefaultPermissions::for_user_type(UserType::Responsable));
        assert!(ability.can(Action::Read, &Resource::Resources));
        assert!(ability.cannot(Action::Write, &Resource::Resources));
        assert!(ability.cannot(Action::Read, &Resource::Financials));
    }

    #[test]
    fn only_nutritionists_manage_nutritionists() {
        let nutritionist = AbilityFactory::new().build(&DefaultPermissions::for_user_type(UserType::Nutritionist));
        let psychologist = AbilityFactory::new().build(&DefaultPermissions::for_user_type(UserType::Psychologist));
        assert!(nutritionist.can(Action::Manage, &Resource::Nutritionists));
        assert!(psychologist.cannot(Action::Read, &Resource::Nutritionists));
    }
}
