use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use caregate_auth::strategies::FederatedProfileSource;
use caregate_auth::{
    AbilityFactory, DefaultPermissions, ProfessionalRecord, ProfessionalType, Profile, ResponsableRecord,
};
use caregate_core::{DomainResult, SubjectId};
use caregate_infra::{AppConfig, InMemoryIdentityStore};

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub identities: Arc<InMemoryIdentityStore>,
    pub permissions: Arc<DefaultPermissions>,
    pub abilities: AbilityFactory,
    pub google: Option<Arc<dyn FederatedProfileSource>>,
    /// Runtime settings managed through the admin routes.
    pub settings: RwLock<Map<String, Value>>,
}

impl AppServices {
    pub fn new(
        config: Arc<AppConfig>,
        identities: Arc<InMemoryIdentityStore>,
        google: Option<Arc<dyn FederatedProfileSource>>,
    ) -> Self {
        Self {
            config,
            identities,
            permissions: Arc::new(DefaultPermissions::new()),
            abilities: AbilityFactory::new(),
            google,
            settings: RwLock::new(Map::new()),
        }
    }
}

/// Identities created by [`seed_demo_identities`].
#[derive(Debug, Clone, Copy)]
pub struct DemoIdentities {
    pub admin: SubjectId,
    pub nutritionist: SubjectId,
    pub psychologist: SubjectId,
    pub responsable: SubjectId,
}

fn profile(name: &str) -> Profile {
    Profile {
        name: name.to_string(),
        email: format!("{}@caregate.local", name.to_ascii_lowercase()),
    }
}

/// Seed one identity of each interesting kind (dev only).
pub fn seed_demo_identities(store: &InMemoryIdentityStore) -> DomainResult<DemoIdentities> {
    let ids = DemoIdentities {
        admin: SubjectId::new(),
        nutritionist: SubjectId::new(),
        psychologist: SubjectId::new(),
        responsable: SubjectId::new(),
    };

    store.insert_professional(ProfessionalRecord {
        id: ids.admin,
        professional_type: ProfessionalType::Secretary,
        is_admin: true,
        profile: profile("Admin"),
    })?;
    store.insert_professional(ProfessionalRecord {
        id: ids.nutritionist,
        professional_type: ProfessionalType::Nutritionist,
        is_admin: false,
        profile: profile("Nina"),
    })?;
    store.insert_professional(ProfessionalRecord {
        id: ids.psychologist,
        professional_type: ProfessionalType::Psychologist,
        is_admin: false,
        profile: profile("Paul"),
    })?;
    store.insert_responsable(ResponsableRecord {
        id: ids.responsable,
        is_admin: false,
        profile: profile("Rita"),
    })?;

    Ok(ids)
}
