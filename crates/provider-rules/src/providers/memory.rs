use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Provider, ProviderId};
use super::duplicates::{CandidateSourceError, DuplicateCandidateSource, DuplicateQuery};
use super::repository::{AuditEntry, ProviderRecord, ProviderRepository, RepositoryError};
use crate::rules::RuleResult;

#[derive(Default)]
struct Store {
    next_id: u64,
    records: BTreeMap<ProviderId, ProviderRecord>,
}

/// Process-local provider store used by the server, CLI, and tests.
#[derive(Default, Clone)]
pub struct InMemoryProviderRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryProviderRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("provider store lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|store| store.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store {
    fn npi_taken(&self, npi: &str, except: Option<ProviderId>) -> bool {
        self.records
            .iter()
            .any(|(id, record)| Some(*id) != except && record.provider.npi == npi)
    }

    fn push(&mut self, mut provider: Provider, audit: AuditEntry) -> ProviderRecord {
        self.next_id += 1;
        let id = ProviderId(self.next_id);
        provider.id = Some(id);

        let record = ProviderRecord {
            provider,
            audit_log: vec![audit],
            rule_evaluations: Vec::new(),
        };
        self.records.insert(id, record.clone());
        record
    }
}

impl ProviderRepository for InMemoryProviderRepository {
    fn insert(
        &self,
        provider: Provider,
        audit: AuditEntry,
    ) -> Result<ProviderRecord, RepositoryError> {
        let mut store = self.lock()?;
        if store.npi_taken(&provider.npi, None) {
            return Err(RepositoryError::Conflict);
        }
        Ok(store.push(provider, audit))
    }

    fn insert_all(
        &self,
        batch: Vec<(Provider, AuditEntry)>,
    ) -> Result<Vec<ProviderRecord>, RepositoryError> {
        let mut store = self.lock()?;
        {
            let mut seen = HashSet::with_capacity(batch.len());
            for (provider, _) in &batch {
                if store.npi_taken(&provider.npi, None) || !seen.insert(provider.npi.as_str()) {
                    return Err(RepositoryError::Conflict);
                }
            }
        }

        Ok(batch
            .into_iter()
            .map(|(provider, audit)| store.push(provider, audit))
            .collect())
    }

    fn update(&self, record: ProviderRecord) -> Result<(), RepositoryError> {
        let id = record.id().ok_or(RepositoryError::NotFound)?;
        let mut store = self.lock()?;
        if !store.records.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if store.npi_taken(&record.provider.npi, Some(id)) {
            return Err(RepositoryError::Conflict);
        }
        store.records.insert(id, record);
        Ok(())
    }

    fn fetch(&self, id: ProviderId) -> Result<Option<ProviderRecord>, RepositoryError> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    fn fetch_by_npi(&self, npi: &str) -> Result<Option<ProviderRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .records
            .values()
            .find(|record| record.provider.npi == npi)
            .cloned())
    }

    fn list(&self) -> Result<Vec<ProviderRecord>, RepositoryError> {
        Ok(self.lock()?.records.values().cloned().collect())
    }

    fn delete(&self, id: ProviderId) -> Result<ProviderRecord, RepositoryError> {
        self.lock()?
            .records
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    fn record_evaluations(
        &self,
        id: ProviderId,
        results: &[RuleResult],
    ) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        let record = store.records.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        record.rule_evaluations.extend_from_slice(results);
        Ok(())
    }
}

impl DuplicateCandidateSource for InMemoryProviderRepository {
    fn candidates(&self, query: &DuplicateQuery) -> Result<Vec<Provider>, CandidateSourceError> {
        let store = self.lock()?;
        Ok(store
            .records
            .values()
            .filter(|record| record.provider.date_of_birth == query.date_of_birth())
            .map(|record| record.provider.clone())
            .collect())
    }
}
