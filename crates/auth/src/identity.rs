//! Caller identities and their hydration from a token subject.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use caregate_core::SubjectId;

use crate::error::{AuthError, IdentitySource};

/// Account kind carried in tokens and on hydrated identities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Nutritionist,
    OccupationalTherapist,
    Psychologist,
    SpeechTherapist,
    Secretary,
    Patient,
    Responsable,
}

/// Subtype stored on a professional profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfessionalType {
    Nutritionist,
    OccupationalTherapist,
    Psychologist,
    SpeechTherapist,
    Secretary,
}

impl From<ProfessionalType> for UserType {
    fn from(value: ProfessionalType) -> Self {
        match value {
            ProfessionalType::Nutritionist => UserType::Nutritionist,
            ProfessionalType::OccupationalTherapist => UserType::OccupationalTherapist,
            ProfessionalType::Psychologist => UserType::Psychologist,
            ProfessionalType::SpeechTherapist => UserType::SpeechTherapist,
            ProfessionalType::Secretary => UserType::Secretary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalRecord {
    pub id: SubjectId,
    pub professional_type: ProfessionalType,
    pub is_admin: bool,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsableRecord {
    pub id: SubjectId,
    pub is_admin: bool,
    pub profile: Profile,
}

/// Fully hydrated caller attached to an authorized call as "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub id: SubjectId,
    pub user_type: UserType,
    pub is_admin: bool,
    pub profile: Profile,
    /// Flat `"<resource>:<action>"` list the policy guard evaluates.
    pub permissions: Vec<String>,
}

/// Professional profile lookups (storage collaborator).
#[async_trait]
pub trait ProfessionalStore: Send + Sync {
    async fn find_professional_by_id(&self, id: SubjectId) -> Option<ProfessionalRecord>;
}

/// Responsible-party profile lookups (storage collaborator).
#[async_trait]
pub trait ResponsableStore: Send + Sync {
    async fn find_responsable_by_id(&self, id: SubjectId) -> Option<ResponsableRecord>;
}

/// Maps a caller identity to its permission strings.
pub trait PermissionSource: Send + Sync {
    fn permissions_for(&self, identity: &CallerIdentity) -> Vec<String>;
}

/// Input of a hydration: what the verified bearer token told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationRequest {
    pub subject_id: SubjectId,
    pub user_type: Option<UserType>,
    pub bypass_terms: bool,
}

#[async_trait]
pub trait IdentityHydrator: Send + Sync {
    async fn hydrate(&self, request: HydrationRequest) -> Result<CallerIdentity, AuthError>;
}

/// Hydrator backed by the two profile stores.
///
/// `RESPONSABLE` subjects are looked up among responsible parties; every other
/// user type, including none at all, among professionals. A professional's
/// user type comes from the stored record, not from the token.
#[derive(Clone)]
pub struct StoreIdentityHydrator {
    professionals: Arc<dyn ProfessionalStore>,
    responsables: Arc<dyn ResponsableStore>,
    permissions: Arc<dyn PermissionSource>,
}

impl StoreIdentityHydrator {
    pub fn new(
        professionals: Arc<dyn ProfessionalStore>,
        responsables: Arc<dyn ResponsableStore>,
        permissions: Arc<dyn PermissionSource>,
    ) -> Self {
        Self {
            professionals,
            responsables,
            permissions,
        }
    }

    async fn responsable(&self, id: SubjectId) -> Result<CallerIdentity, AuthError> {
        let record = self
            .responsables
            .find_responsable_by_id(id)
            .await
            .ok_or_else(|| not_found(IdentitySource::Responsables, id))?;

        Ok(CallerIdentity {
            id: record.id,
            user_type: UserType::Responsable,
            is_admin: record.is_admin,
            profile: record.profile,
            permissions: Vec::new(),
        })
    }

    async fn professional(&self, id: SubjectId) -> Result<CallerIdentity, AuthError> {
        let record = self
            .professionals
            .find_professional_by_id(id)
            .await
            .ok_or_else(|| not_found(IdentitySource::Professionals, id))?;

        Ok(CallerIdentity {
            id: record.id,
            user_type: record.professional_type.into(),
            is_admin: record.is_admin,
            profile: record.profile,
            permissions: Vec::new(),
        })
    }
}

fn not_found(store: IdentitySource, subject_id: SubjectId) -> AuthError {
    tracing::error!(%subject_id, %store, "authenticated subject has no backing identity record");
    AuthError::IdentityNotFound { store, subject_id }
}

#[async_trait]
impl IdentityHydrator for StoreIdentityHydrator {
    async fn hydrate(&self, request: HydrationRequest) -> Result<CallerIdentity, AuthError> {
        tracing::debug!(
            subject_id = %request.subject_id,
            user_type = ?request.user_type,
            bypass_terms = request.bypass_terms,
            "hydrating caller identity"
        );

        let mut identity = match request.user_type {
            Some(UserType::Responsable) => self.responsable(request.subject_id).await?,
            _ => self.professional(request.subject_id).await?,
        };

        identity.permissions = self.permissions.permissions_for(&identity);
        Ok(identity)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-crate test doubles for the storage collaborators.

    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;

    #[derive(Default)]
    pub struct MemoryProfiles {
        professionals: RwLock<HashMap<SubjectId, ProfessionalRecord>>,
        responsables: RwLock<HashMap<SubjectId, ResponsableRecord>>,
    }

    impl MemoryProfiles {
        pub fn with_professional(self, id: SubjectId, kind: ProfessionalType, is_admin: bool) -> Self {
            self.professionals.write().unwrap().insert(
                id,
                ProfessionalRecord {
                    id,
                    professional_type: kind,
                    is_admin,
                    profile: Profile {
                        name: "Pro".into(),
                        email: "pro@example.com".into(),
                    },
                },
            );
            self
        }

        pub fn with_responsable(self, id: SubjectId) -> Self {
            self.responsables.write().unwrap().insert(
                id,
                ResponsableRecord {
                    id,
                    is_admin: false,
                    profile: Profile {
                        name: "Resp".into(),
                        email: "resp@example.com".into(),
                    },
                },
            );
            self
        }
    }

    #[async_trait]
    impl ProfessionalStore for MemoryProfiles {
        async fn find_professional_by_id(&self, id: SubjectId) -> Option<ProfessionalRecord> {
            self.professionals.read().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl ResponsableStore for MemoryProfiles {
        async fn find_responsable_by_id(&self, id: SubjectId) -> Option<ResponsableRecord> {
            self.responsables.read().unwrap().get(&id).cloned()
        }
    }

    pub fn hydrator(profiles: MemoryProfiles) -> StoreIdentityHydrator {
        let profiles = Arc::new(profiles);
        StoreIdentityHydrator::new(
            profiles.clone(),
            profiles,
            Arc::new(crate::defaults::DefaultPermissions::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn request(subject_id: SubjectId, user_type: Option<UserType>) -> HydrationRequest {
        HydrationRequest {
            subject_id,
            user_type,
            bypass_terms: false,
        }
    }

    #[tokio::test]
    async fn responsable_branch_uses_responsable_store() {
        let id = SubjectId::new();
        let h = hydrator(MemoryProfiles::default().with_responsable(id));

        let identity = h.hydrate(request(id, Some(UserType::Responsable))).await.unwrap();
        assert_eq!(identity.user_type, UserType::Responsable);
        assert!(identity.permissions.contains(&"resources:read".to_string()));
    }

    #[tokio::test]
    async fn professional_subtype_comes_from_record_not_token() {
        let id = SubjectId::new();
        let h = hydrator(MemoryProfiles::default().with_professional(id, ProfessionalType::Psychologist, false));

        let identity = h.hydrate(request(id, Some(UserType::Nutritionist))).await.unwrap();
        assert_eq!(identity.user_type, UserType::Psychologist);
    }

    #[tokio::test]
    async fn missing_user_type_defaults_to_professional_store() {
        let id = SubjectId::new();
        let h = hydrator(MemoryProfiles::default().with_professional(id, ProfessionalType::Secretary, true));

        let identity = h.hydrate(request(id, None)).await.unwrap();
        assert_eq!(identity.user_type, UserType::Secretary);
        assert_eq!(identity.permissions, vec!["all".to_string()]);
    }

    #[tokio::test]
    async fn not_found_names_the_queried_store() {
        let id = SubjectId::new();
        // Present as a professional, but the token says responsable.
        let h = hydrator(MemoryProfiles::default().with_professional(id, ProfessionalType::Nutritionist, false));

        let err = h.hydrate(request(id, Some(UserType::Responsable))).await.unwrap_err();
        assert_eq!(
            err,
            AuthError::IdentityNotFound {
                store: IdentitySource::Responsables,
                subject_id: id
            }
        );

        let err = h.hydrate(request(SubjectId::new(), None)).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::IdentityNotFound {
                store: IdentitySource::Professionals,
                ..
            }
        ));
    }
}
