use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Provider, ProviderId};
use super::duplicates::DuplicateCandidateSource;
use crate::rules::RuleResult;

/// Stored provider together with its audit trail and persisted rule results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub provider: Provider,
    pub audit_log: Vec<AuditEntry>,
    pub rule_evaluations: Vec<RuleResult>,
}

impl ProviderRecord {
    /// Stored records always carry the id the repository assigned.
    pub fn id(&self) -> Option<ProviderId> {
        self.provider.id
    }
}

/// Single change recorded against a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn now(action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Storage abstraction for provider records.
///
/// Every store doubles as the duplicate candidate source so the duplicate
/// rule and the registry's duplicate lookup read from the same data.
pub trait ProviderRepository: DuplicateCandidateSource {
    /// Persist a new provider, assigning its id. Fails with `Conflict` on a taken NPI.
    fn insert(
        &self,
        provider: Provider,
        audit: AuditEntry,
    ) -> Result<ProviderRecord, RepositoryError>;
    /// Persist a batch atomically: either every provider is stored or none is.
    fn insert_all(
        &self,
        batch: Vec<(Provider, AuditEntry)>,
    ) -> Result<Vec<ProviderRecord>, RepositoryError>;
    fn update(&self, record: ProviderRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ProviderId) -> Result<Option<ProviderRecord>, RepositoryError>;
    fn fetch_by_npi(&self, npi: &str) -> Result<Option<ProviderRecord>, RepositoryError>;
    /// All records ordered by id.
    fn list(&self) -> Result<Vec<ProviderRecord>, RepositoryError>;
    fn delete(&self, id: ProviderId) -> Result<ProviderRecord, RepositoryError>;
    fn record_evaluations(
        &self,
        id: ProviderId,
        results: &[RuleResult],
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
