use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{FactError, Provider, ProviderId, ProviderPayload, VerificationStatus};
use super::duplicates::{find_duplicates, CandidateSourceError, DuplicateQuery};
use super::normalize::normalize_provider;
use super::repository::{AuditEntry, ProviderRecord, ProviderRepository, RepositoryError};
use super::views::ProviderView;

/// Registry-side operations on provider records: intake, lookup, and upkeep.
pub struct ProviderService<R> {
    repository: Arc<R>,
    expiring_soon_days: i64,
}

impl<R> ProviderService<R>
where
    R: ProviderRepository + 'static,
{
    pub fn new(repository: Arc<R>, expiring_soon_days: i64) -> Self {
        Self {
            repository,
            expiring_soon_days,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Normalise and store a new provider, refusing potential duplicates.
    pub fn create(&self, payload: ProviderPayload) -> Result<ProviderRecord, ProviderServiceError> {
        let mut provider = Provider::try_from(payload)?;
        normalize_provider(&mut provider);
        provider.id = None;

        let duplicates =
            find_duplicates(self.repository.as_ref(), &DuplicateQuery::for_provider(&provider))?;
        if !duplicates.is_empty() {
            return Err(ProviderServiceError::Duplicates(duplicates));
        }

        let details = format!("Provider created with NPI: {}", provider.npi);
        let record = self
            .repository
            .insert(provider, AuditEntry::now("PROVIDER_CREATED", details))?;
        info!(provider_id = ?record.id(), npi = %record.provider.npi, "provider created");
        Ok(record)
    }

    /// Store a batch without duplicate screening. Every payload is validated
    /// before anything is written, and a taken NPI rejects the whole batch.
    pub fn create_bulk(
        &self,
        payloads: Vec<ProviderPayload>,
    ) -> Result<Vec<ProviderRecord>, ProviderServiceError> {
        let providers = payloads
            .into_iter()
            .map(|payload| {
                let mut provider = Provider::try_from(payload)?;
                normalize_provider(&mut provider);
                provider.id = None;
                Ok(provider)
            })
            .collect::<Result<Vec<_>, FactError>>()?;

        let batch = providers
            .into_iter()
            .map(|provider| {
                let details = format!("Provider created with NPI: {}", provider.npi);
                (provider, AuditEntry::now("PROVIDER_CREATED", details))
            })
            .collect();
        let records = self.repository.insert_all(batch)?;
        info!(count = records.len(), "bulk provider import stored");
        Ok(records)
    }

    pub fn get(&self, id: ProviderId) -> Result<ProviderRecord, ProviderServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(ProviderServiceError::NotFound(id))
    }

    pub fn get_by_npi(&self, npi: &str) -> Result<ProviderRecord, ProviderServiceError> {
        self.repository
            .fetch_by_npi(npi)?
            .ok_or_else(|| ProviderServiceError::NpiNotFound(npi.to_string()))
    }

    pub fn list(&self) -> Result<Vec<ProviderRecord>, ProviderServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn list_by_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<ProviderRecord>, ProviderServiceError> {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|record| record.provider.verification_status == status)
            .collect())
    }

    /// Replace the provider facts of an existing record. Audit and rule history are kept.
    pub fn update(
        &self,
        id: ProviderId,
        payload: ProviderPayload,
    ) -> Result<ProviderRecord, ProviderServiceError> {
        let mut record = self.get(id)?;
        let mut provider = Provider::try_from(payload)?;
        provider.id = Some(id);

        let details = format!(
            "Provider updated. Old NPI: {}, New NPI: {}",
            record.provider.npi, provider.npi
        );
        record.provider = provider;
        record
            .audit_log
            .push(AuditEntry::now("PROVIDER_UPDATED", details));

        self.repository.update(record.clone()).map_err(|err| match err {
            RepositoryError::NotFound => ProviderServiceError::NotFound(id),
            other => other.into(),
        })?;
        info!(provider_id = %id, "provider updated");
        Ok(record)
    }

    pub fn delete(&self, id: ProviderId) -> Result<(), ProviderServiceError> {
        let removed = self.repository.delete(id).map_err(|err| match err {
            RepositoryError::NotFound => ProviderServiceError::NotFound(id),
            other => other.into(),
        })?;
        info!(provider_id = %id, npi = %removed.provider.npi, "provider deleted");
        Ok(())
    }

    /// Normalise the stored names and NPI in place.
    pub fn normalize(&self, id: ProviderId) -> Result<ProviderRecord, ProviderServiceError> {
        let record = self.get(id)?;
        let mut provider = record.provider;
        normalize_provider(&mut provider);
        self.update(id, ProviderPayload::from(&provider))
    }

    /// Other stored providers sharing this provider's name and date of birth.
    pub fn find_duplicates(&self, id: ProviderId) -> Result<Vec<Provider>, ProviderServiceError> {
        let record = self.get(id)?;
        let query = DuplicateQuery::for_provider(&record.provider);
        Ok(find_duplicates(self.repository.as_ref(), &query)?)
    }

    pub fn audit_trail(&self, id: ProviderId) -> Result<Vec<AuditEntry>, ProviderServiceError> {
        Ok(self.get(id)?.audit_log)
    }

    pub fn view(&self, record: &ProviderRecord, today: NaiveDate) -> ProviderView {
        ProviderView::from_record(record, today, self.expiring_soon_days)
    }
}

/// Error raised by the provider service.
#[derive(Debug, thiserror::Error)]
pub enum ProviderServiceError {
    #[error(transparent)]
    Fact(#[from] FactError),
    #[error("potential duplicate providers found")]
    Duplicates(Vec<Provider>),
    #[error("provider not found with id: {0}")]
    NotFound(ProviderId),
    #[error("provider not found with NPI: {0}")]
    NpiNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Candidates(#[from] CandidateSourceError),
}
