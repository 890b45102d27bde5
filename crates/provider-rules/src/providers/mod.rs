//! Provider fact model and the registry-side collaborators around the rule engine.

pub mod domain;
pub mod duplicates;
pub mod memory;
pub mod normalize;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    FactError, License, LicensePayload, LicenseStatus, PracticeLocation, PracticeLocationPayload,
    Provider, ProviderId, ProviderPayload, VerificationStatus,
};
pub use duplicates::{
    find_duplicates, find_matches, CandidateSourceError, DuplicateCandidateSource, DuplicateQuery,
    StaticCandidates,
};
pub use memory::InMemoryProviderRepository;
pub use normalize::{normalize_name, normalize_npi, normalize_provider};
pub use repository::{AuditEntry, ProviderRecord, ProviderRepository, RepositoryError};
pub use router::provider_router;
pub use service::{ProviderService, ProviderServiceError};
pub use views::{LicenseView, PracticeLocationView, ProviderView};
