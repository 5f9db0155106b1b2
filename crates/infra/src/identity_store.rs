//! In-memory identity storage for dev/tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use caregate_auth::{ProfessionalRecord, ProfessionalStore, ResponsableRecord, ResponsableStore};
use caregate_core::{DomainError, DomainResult, SubjectId};

/// Professional and responsible-party profiles keyed by subject id.
///
/// A subject id belongs to at most one of the two collections.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    professionals: RwLock<HashMap<SubjectId, ProfessionalRecord>>,
    responsables: RwLock<HashMap<SubjectId, ResponsableRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_taken(&self, id: SubjectId) -> bool {
        let professional = self.professionals.read().map(|m| m.contains_key(&id)).unwrap_or(false);
        let responsable = self.responsables.read().map(|m| m.contains_key(&id)).unwrap_or(false);
        professional || responsable
    }

    pub fn insert_professional(&self, record: ProfessionalRecord) -> DomainResult<()> {
        if self.is_taken(record.id) {
            return Err(DomainError::conflict(format!("subject {} already registered", record.id)));
        }
        let mut map = self
            .professionals
            .write()
            .map_err(|_| DomainError::conflict("professional store poisoned"))?;
        map.insert(record.id, record);
        Ok(())
    }

    pub fn insert_responsable(&self, record: ResponsableRecord) -> DomainResult<()> {
        if self.is_taken(record.id) {
            return Err(DomainError::conflict(format!("subject {} already registered", record.id)));
        }
        let mut map = self
            .responsables
            .write()
            .map_err(|_| DomainError::conflict("responsable store poisoned"))?;
        map.insert(record.id, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        let professionals = self.professionals.read().map(|m| m.len()).unwrap_or(0);
        let responsables = self.responsables.read().map(|m| m.len()).unwrap_or(0);
        professionals + responsables
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfessionalStore for InMemoryIdentityStore {
    async fn find_professional_by_id(&self, id: SubjectId) -> Option<ProfessionalRecord> {
        let map = self.professionals.read().ok()?;
        map.get(&id).cloned()
    }
}

#[async_trait]
impl ResponsableStore for InMemoryIdentityStore {
    async fn find_responsable_by_id(&self, id: SubjectId) -> Option<ResponsableRecord> {
        let map = self.responsables.read().ok()?;
        map.get(&id).cloned()
    }
}
